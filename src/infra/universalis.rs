//! Thin asynchronous client for the Universalis aggregated market endpoint.
//!
//! One request per item: `GET {base}/aggregated/{world}/{item_id}`. The
//! response carries world, data-center and region scopes for normal and
//! high quality; only the six fields the market table needs are kept.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::{MarketDataSource, MarketFields};
use crate::util::settings::{MarketQuality, Settings};
use crate::util::version;

#[derive(Debug, Error)]
pub enum MarketClientError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),
}

#[derive(Clone, Debug)]
pub struct UniversalisClient {
    http: Client,
    base_url: Url,
    world: String,
    quality: MarketQuality,
}

impl UniversalisClient {
    pub fn from_settings(settings: &Settings) -> Result<Self, MarketClientError> {
        let base_url = Url::parse(&settings.base_url)?;
        let http = Client::builder()
            .user_agent(version::user_agent())
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url,
            world: settings.world.clone(),
            quality: settings.quality,
        })
    }

    fn url(&self, item_id: &str) -> Result<Url, url::ParseError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["aggregated", self.world.as_str(), item_id]);
        Ok(url)
    }
}

impl MarketDataSource for UniversalisClient {
    type Error = MarketClientError;

    async fn fetch(&self, item_id: &str) -> Result<Option<MarketFields>, MarketClientError> {
        let url = self.url(item_id)?;
        debug!(%url, "requesting market data");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MarketClientError::Status(status));
        }

        let payload: AggregatedResponse = response.json().await?;
        Ok(payload.into_fields(self.quality))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AggregatedResponse {
    #[serde(default)]
    results: Vec<AggregatedResult>,
    #[serde(default)]
    failed_items: Vec<serde_json::Value>,
}

impl AggregatedResponse {
    /// Fields of the first result, or `None` for an empty result set.
    fn into_fields(self, quality: MarketQuality) -> Option<MarketFields> {
        if !self.failed_items.is_empty() {
            debug!(failed = ?self.failed_items, "universalis reported failed items");
        }
        let result = self.results.into_iter().next()?;
        let block = match quality {
            MarketQuality::Nq => result.nq,
            MarketQuality::Hq => result.hq,
        }
        .unwrap_or_default();
        Some(block.into())
    }
}

#[derive(Debug, Deserialize)]
struct AggregatedResult {
    #[serde(default)]
    nq: Option<QualityBlock>,
    #[serde(default)]
    hq: Option<QualityBlock>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QualityBlock {
    #[serde(default)]
    min_listing: Option<Scoped>,
    #[serde(default)]
    recent_purchase: Option<Scoped>,
    #[serde(default)]
    average_sale_price: Option<Scoped>,
    #[serde(default)]
    daily_sale_velocity: Option<Scoped>,
}

#[derive(Debug, Default, Deserialize)]
struct Scoped {
    #[serde(default)]
    world: Option<Point>,
    #[serde(default)]
    dc: Option<Point>,
}

#[derive(Debug, Default, Deserialize)]
struct Point {
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    quantity: Option<f64>,
}

fn world_price(scoped: &Option<Scoped>) -> Option<f64> {
    scoped.as_ref()?.world.as_ref()?.price
}

fn dc_price(scoped: &Option<Scoped>) -> Option<f64> {
    scoped.as_ref()?.dc.as_ref()?.price
}

impl From<QualityBlock> for MarketFields {
    fn from(block: QualityBlock) -> Self {
        Self {
            min_listing_world: world_price(&block.min_listing),
            min_listing_dc: dc_price(&block.min_listing),
            recent_purchase_world: world_price(&block.recent_purchase),
            recent_purchase_dc: dc_price(&block.recent_purchase),
            average_sale_price_dc: dc_price(&block.average_sale_price),
            daily_sale_velocity_dc: block
                .daily_sale_velocity
                .as_ref()
                .and_then(|scoped| scoped.dc.as_ref())
                .and_then(|point| point.quantity),
        }
    }
}

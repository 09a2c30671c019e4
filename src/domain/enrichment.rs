//! Market enrichment of the gathering and crafting lists.
//!
//! Items are priced one at a time. The market board rate-limits clients, so
//! every request goes through a [`Throttle`] and failures never abort the run:
//! an item that cannot be priced keeps all market fields empty.

use std::collections::HashSet;
use std::fmt::Display;

use tracing::{debug, info, warn};

use super::catalog::ItemCatalog;
use super::entities::{Category, MarketFields, MarketRecord};

/// Per-item price lookup.
///
/// `Ok(None)` means the request succeeded but the market had no result for
/// the item.
#[allow(async_fn_in_trait)]
pub trait MarketDataSource {
    type Error: Display;

    async fn fetch(&self, item_id: &str) -> Result<Option<MarketFields>, Self::Error>;
}

/// Paces successive market requests.
#[allow(async_fn_in_trait)]
pub trait Throttle {
    /// Wait until the next request may start.
    async fn ready(&mut self);
}

/// Terminal state of one item's market lookup.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome {
    Success,
    EmptyResult,
    NetworkError(String),
    NoId,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnrichmentReport {
    pub records: Vec<MarketRecord>,
    pub outcomes: Vec<FetchOutcome>,
}

impl EnrichmentReport {
    pub fn count(&self, predicate: impl Fn(&FetchOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|outcome| predicate(outcome)).count()
    }
}

/// Combine both lists, gathering items first, keeping the first row for each
/// exact item name.
pub fn union_items<'a, G, C>(gathering: G, crafting: C) -> Vec<MarketRecord>
where
    G: IntoIterator<Item = &'a str>,
    C: IntoIterator<Item = &'a str>,
{
    let tagged = gathering
        .into_iter()
        .map(|name| (name, Category::Gathering))
        .chain(crafting.into_iter().map(|name| (name, Category::Crafting)));

    let mut seen = HashSet::new();
    tagged
        .filter(|(name, _)| seen.insert(*name))
        .map(|(name, category)| MarketRecord::new(name, category))
        .collect()
}

pub struct MarketEnrichment<'c, S, T> {
    catalog: &'c ItemCatalog,
    source: S,
    throttle: T,
}

impl<'c, S, T> MarketEnrichment<'c, S, T>
where
    S: MarketDataSource,
    T: Throttle,
{
    pub fn new(catalog: &'c ItemCatalog, source: S, throttle: T) -> Self {
        Self {
            catalog,
            source,
            throttle,
        }
    }

    /// Resolve IDs and fill market fields, strictly in order. Every record
    /// is fully processed before the next one starts.
    pub async fn enrich(&mut self, mut records: Vec<MarketRecord>) -> EnrichmentReport {
        let mut outcomes = Vec::with_capacity(records.len());

        for record in &mut records {
            record.item_id = self.catalog.resolve(&record.item_name).cloned();
            let outcome = match record.item_id.as_deref() {
                Some(item_id) => {
                    self.throttle.ready().await;
                    let (fields, outcome) = self.fetch_one(&record.item_name, item_id).await;
                    record.market = fields;
                    outcome
                }
                None => {
                    warn!(
                        item = %record.item_name,
                        category = %record.category,
                        "no item ID found, skipping market query"
                    );
                    FetchOutcome::NoId
                }
            };
            outcomes.push(outcome);
        }

        let report = EnrichmentReport { records, outcomes };
        info!(
            items = report.records.len(),
            priced = report.count(|o| *o == FetchOutcome::Success),
            empty = report.count(|o| *o == FetchOutcome::EmptyResult),
            failed = report.count(|o| matches!(o, FetchOutcome::NetworkError(_))),
            unresolved = report.count(|o| *o == FetchOutcome::NoId),
            "market enrichment finished"
        );
        report
    }

    async fn fetch_one(&self, item: &str, item_id: &str) -> (MarketFields, FetchOutcome) {
        match self.source.fetch(item_id).await {
            Ok(Some(fields)) => {
                debug!(item, item_id, "market data received");
                (fields, FetchOutcome::Success)
            }
            Ok(None) => {
                warn!(item, item_id, "no market results");
                (MarketFields::default(), FetchOutcome::EmptyResult)
            }
            Err(error) => {
                warn!(item, item_id, %error, "market request failed");
                (
                    MarketFields::default(),
                    FetchOutcome::NetworkError(error.to_string()),
                )
            }
        }
    }
}

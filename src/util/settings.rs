use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;
use tracing::debug;

use crate::domain::DuplicatePolicy;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "WorkshopPlanner";
const APP_NAME: &str = "WorkshopPlanner";

pub const DEFAULT_BASE_URL: &str = "https://universalis.app/api/v2/";
pub const DEFAULT_WORLD: &str = "Seraph";

/// Which quality tier to read prices for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MarketQuality {
    #[default]
    Nq,
    Hq,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub world: String,
    pub base_url: String,
    /// Pause between market requests. Universalis throttles clients that go
    /// faster, so keep this at 500 or above.
    pub request_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub quality: MarketQuality,
    pub duplicate_policy: DuplicatePolicy,
    pub detect_cycles: bool,
    /// Fixed width for loaded tables; wider rows are dropped.
    pub max_columns: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world: DEFAULT_WORLD.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_delay_ms: 500,
            request_timeout_secs: 30,
            quality: MarketQuality::Nq,
            duplicate_policy: DuplicatePolicy::LastWins,
            detect_cycles: true,
            max_columns: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed settings in {path}: {source}")]
    Serde {
        path: PathBuf,
        #[source]
        source: SerdeError,
    },
}

fn settings_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join("settings.json"))
}

/// Load settings from `explicit`, or from the platform config directory.
///
/// An explicit path must exist. The default location is optional and falls
/// back to [`Settings::default`].
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, SettingsError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match settings_file() {
            Some(path) if path.exists() => path,
            _ => {
                debug!("no settings file, using defaults");
                return Ok(Settings::default());
            }
        },
    };

    let data = fs::read_to_string(&path).map_err(|source| SettingsError::Io {
        path: path.clone(),
        source,
    })?;
    let settings = parse_settings(&data).map_err(|source| SettingsError::Serde {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), "loaded settings");
    Ok(settings)
}

fn parse_settings(data: &str) -> Result<Settings, SerdeError> {
    serde_json::from_str(data)
}

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::EngineError;

const ENV_PREFIX: &str = "RANKER";
const DEFAULT_FILE: &str = "ranker";

/// Engine settings. Every field has a default so an empty source set is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Cards considered per invocation; `None` processes everything.
    pub max_cards: Option<usize>,
    pub geocode_enabled: bool,
    pub geocode_endpoint: String,
    pub geocode_timeout_secs: u64,
    pub geocode_user_agent: String,
    /// Fuzzy location tier applies when similarity is strictly above this.
    pub fuzzy_threshold: f64,
    pub deadline_secs: Option<u64>,
    pub parallel: bool,
    pub db_path: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            max_cards: Some(3),
            geocode_enabled: true,
            geocode_endpoint: "https://nominatim.openstreetmap.org/search".to_string(),
            geocode_timeout_secs: 5,
            geocode_user_agent: concat!("card_ranker/", env!("CARGO_PKG_VERSION")).to_string(),
            fuzzy_threshold: 0.7,
            deadline_secs: None,
            parallel: false,
            db_path: "data/candidates.sqlite".to_string(),
        }
    }
}

impl EngineSettings {
    /// Layered load: optional `ranker.{toml,json,yaml}` (or `file`), then `RANKER_*` env vars.
    pub fn load(file: Option<&Path>) -> Result<Self, EngineError> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };
        let mut settings = Config::builder()
            .add_source(file_source)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize::<EngineSettings>()?;
        // 0 reads as "no cap", same as the CLI
        if settings.max_cards == Some(0) {
            settings.max_cards = None;
        }
        Ok(settings)
    }

    pub fn geocode_timeout(&self) -> Duration {
        Duration::from_secs(self.geocode_timeout_secs)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

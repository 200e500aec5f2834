use crate::catalog::{default_tickers, Catalog, Palette, TickerEntry, DEFAULT_PALETTE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const APP_NAME: &str = "portpuls";
pub const CONFIG_NAME: &str = "config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub request_timeout_secs: u64,
    pub tickers: Vec<TickerEntry>,
    pub palette: Vec<String>,
    pub log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/analyze".to_string(),
            request_timeout_secs: 30,
            tickers: default_tickers(),
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            log_file: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Config, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    pub fn path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    // An emptied ticker table in the config would leave nothing to select.
    pub fn catalog(&self) -> Catalog {
        if self.tickers.is_empty() {
            Catalog::default()
        } else {
            Catalog::new(self.tickers.clone())
        }
    }

    pub fn palette(&self) -> Palette {
        if self.palette.is_empty() {
            Palette::default()
        } else {
            Palette::from_hex(&self.palette)
        }
    }
}

//! Application settings.

use std::path::PathBuf;
use std::time::Duration;

use super::{ConfigLayer, BASES_JSON_URL_FALLBACK};
use crate::manifest::DEFAULT_MANIFEST_TIMEOUT;
use crate::sheets::DEFAULT_SHEET_TIMEOUT;

/// Default snapshot directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding the snapshot and status report.
    pub data_dir: PathBuf,
    /// Manifest (bases.json) URL.
    pub manifest_url: String,
    /// Which configuration layer supplied `manifest_url`.
    pub manifest_url_layer: ConfigLayer,
    pub manifest_timeout: Duration,
    pub sheet_timeout: Duration,
    /// User agent override for HTTP requests.
    pub user_agent: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            manifest_url: BASES_JSON_URL_FALLBACK.to_string(),
            manifest_url_layer: ConfigLayer::Fallback,
            manifest_timeout: DEFAULT_MANIFEST_TIMEOUT,
            sheet_timeout: DEFAULT_SHEET_TIMEOUT,
            user_agent: None,
        }
    }
}

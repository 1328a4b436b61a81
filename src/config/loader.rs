//! Settings resolution from overrides, environment, and config file.

use std::path::PathBuf;
use std::time::Duration;

use super::{
    first_present, ConfigLayer, FileConfig, Settings, BASES_JSON_URL_FALLBACK,
    BASES_JSON_URL_KEY, DATA_DIR_ENV, DEFAULT_CONFIG_FILE,
};

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (defaults to `config.json` in the CWD).
    pub config_path: Option<PathBuf>,
    /// Snapshot directory (--data-dir flag).
    pub data_dir: Option<PathBuf>,
    /// Explicit manifest URL, highest precedence.
    pub bases_url: Option<String>,
}

/// Load settings using the process environment.
pub fn load_settings(options: &LoadOptions) -> Settings {
    load_settings_with_env(options, |key| std::env::var(key).ok())
}

/// Load settings with an injectable environment lookup.
pub fn load_settings_with_env<F>(options: &LoadOptions, env: F) -> Settings
where
    F: Fn(&str) -> Option<String>,
{
    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    if options.config_path.is_some() && !config_path.exists() {
        tracing::warn!("Config file {} does not exist", config_path.display());
    }
    let file = FileConfig::load_from_path(&config_path).unwrap_or_default();

    let (manifest_url_layer, manifest_url) = first_present([
        (ConfigLayer::Override, options.bases_url.clone()),
        (ConfigLayer::Environment, env(BASES_JSON_URL_KEY)),
        (ConfigLayer::ConfigFile, file.bases_json_url.clone()),
    ])
    .unwrap_or((ConfigLayer::Fallback, BASES_JSON_URL_FALLBACK.to_string()));
    tracing::debug!("Manifest URL from {}: {}", manifest_url_layer.as_str(), manifest_url);

    let mut settings = Settings {
        manifest_url,
        manifest_url_layer,
        user_agent: file.user_agent.clone(),
        ..Default::default()
    };

    // Relative data_dir in the file resolves against the file's directory
    let file_data_dir = file.data_dir.as_ref().map(|dir| {
        let dir = PathBuf::from(dir);
        match file.base_dir() {
            Some(base) if dir.is_relative() => base.join(dir),
            _ => dir,
        }
    });
    if let Some(dir) = options
        .data_dir
        .clone()
        .or_else(|| env(DATA_DIR_ENV).filter(|s| !s.is_empty()).map(PathBuf::from))
        .or(file_data_dir)
    {
        settings.data_dir = dir;
    }

    if let Some(secs) = file.request_timeout {
        settings.manifest_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file.sheet_timeout {
        settings.sheet_timeout = Duration::from_secs(secs);
    }

    settings
}

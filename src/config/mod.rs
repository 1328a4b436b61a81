//! Configuration: manifest URL lookup and runtime settings.
//!
//! The manifest URL is resolved from an ordered list of layers and the first
//! present value wins: explicit override, `BASES_JSON_URL` in the
//! environment, `BASES_JSON_URL` in `config.json`, then a built-in fallback.

mod loader;
mod settings;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use loader::{load_settings, load_settings_with_env, LoadOptions};
pub use settings::Settings;

/// Key used both as environment variable and config-file field.
pub const BASES_JSON_URL_KEY: &str = "BASES_JSON_URL";

/// Environment variable overriding the snapshot directory.
pub const DATA_DIR_ENV: &str = "ROADWORKS_DATA_DIR";

/// Manifest URL used when nothing else is configured.
pub const BASES_JSON_URL_FALLBACK: &str = "https://intranet.invalid/programacao/bases.json";

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayer {
    Override,
    Environment,
    ConfigFile,
    Fallback,
}

impl ConfigLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Environment => "environment",
            Self::ConfigFile => "config file",
            Self::Fallback => "built-in fallback",
        }
    }
}

/// Pick the first non-empty value from `layers`, in order.
pub fn first_present<I>(layers: I) -> Option<(ConfigLayer, String)>
where
    I: IntoIterator<Item = (ConfigLayer, Option<String>)>,
{
    layers.into_iter().find_map(|(layer, value)| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(|v| (layer, v))
    })
}

/// Contents of `config.json`. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(rename = "BASES_JSON_URL", default, skip_serializing_if = "Option::is_none")]
    pub bases_json_url: Option<String>,
    /// Snapshot directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Manifest request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Sheet download timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Path this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl FileConfig {
    /// Read a config file. Missing or malformed files count as absent.
    pub fn load_from_path(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Could not read config file {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_str::<FileConfig>(&content) {
            Ok(mut config) => {
                config.source_path = Some(path.to_path_buf());
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed config file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Directory containing the config file, for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent())
            .map(|p| p.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_first_present_respects_order() {
        let resolved = first_present([
            (ConfigLayer::Override, None),
            (ConfigLayer::Environment, Some("https://env/bases.json".to_string())),
            (ConfigLayer::ConfigFile, Some("https://file/bases.json".to_string())),
        ]);
        assert_eq!(
            resolved,
            Some((ConfigLayer::Environment, "https://env/bases.json".to_string()))
        );
    }

    #[test]
    fn test_first_present_skips_blank_values() {
        let resolved = first_present([
            (ConfigLayer::Override, Some("   ".to_string())),
            (ConfigLayer::Fallback, Some("https://fallback".to_string())),
        ]);
        assert_eq!(resolved.unwrap().0, ConfigLayer::Fallback);
        assert_eq!(first_present([(ConfigLayer::Override, None)]), None);
    }

    #[test]
    fn test_file_config_reads_bases_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"BASES_JSON_URL": "https://file/bases.json", "sheet_timeout": 5, "other": 1}"#,
        )
        .unwrap();

        let config = FileConfig::load_from_path(&path).unwrap();
        assert_eq!(config.bases_json_url.as_deref(), Some("https://file/bases.json"));
        assert_eq!(config.sheet_timeout, Some(5));
        assert_eq!(config.base_dir().as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_file_config_missing_or_malformed_is_none() {
        let dir = tempdir().unwrap();
        assert!(FileConfig::load_from_path(&dir.path().join("absent.json")).is_none());

        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(FileConfig::load_from_path(&path).is_none());
    }
}

//! Manifest (`bases.json`) resolution.
//!
//! The manifest is a small JSON object naming the current-week and next-week
//! programming sheets:
//!
//! ```json
//! {
//!   "semana_atual":   {"url": "https://...", "label": "Semana Atual"},
//!   "proxima_semana": {"url": "",            "label": "Próxima Semana"}
//! }
//! ```
//!
//! Problems fetching or parsing it are reported as a message in the
//! [`ManifestResolution`], never as an error.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::http_client::HttpClient;
use crate::utils::titleize;

/// Default timeout for the manifest request.
pub const DEFAULT_MANIFEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Manifest keys, in ingestion order.
pub const MANIFEST_KEYS: [&str; 2] = ["semana_atual", "proxima_semana"];

/// Label used when the manifest gives an empty one.
pub const UNNAMED_LABEL: &str = "(sem nome)";

/// One source slot from the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptor {
    pub key: String,
    /// Sheet URL, empty when the slot is not configured.
    pub url: String,
    pub label: String,
}

/// Sources read from the manifest, or the reason there are none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestResolution {
    pub sources: Vec<SourceDescriptor>,
    pub problem: Option<String>,
}

impl ManifestResolution {
    fn problem(message: impl Into<String>) -> Self {
        Self {
            sources: Vec::new(),
            problem: Some(message.into()),
        }
    }
}

/// Read the fixed source slots from a parsed manifest.
pub fn parse_manifest(manifest: &Value) -> ManifestResolution {
    let Some(object) = manifest.as_object() else {
        return ManifestResolution::problem("O conteúdo do bases.json não é um objeto JSON.");
    };

    let sources = MANIFEST_KEYS
        .iter()
        .map(|key| {
            let item = object.get(*key).filter(|v| !v.is_null());
            let url = item
                .and_then(|i| i.get("url"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim()
                .to_string();
            let label = match item.and_then(|i| i.get("label")) {
                None => titleize(key),
                Some(Value::String(s)) if !s.is_empty() => s.clone(),
                Some(Value::String(_)) | Some(Value::Null) => UNNAMED_LABEL.to_string(),
                Some(other) => other.to_string(),
            };
            SourceDescriptor {
                key: key.to_string(),
                url,
                label,
            }
        })
        .collect();

    ManifestResolution {
        sources,
        problem: None,
    }
}

/// Anything that can resolve a manifest URL into sources.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    async fn resolve(&self, url: &str) -> ManifestResolution;
}

/// Fetches the manifest over HTTP.
#[derive(Clone)]
pub struct ManifestResolver {
    client: HttpClient,
    timeout: Duration,
}

impl ManifestResolver {
    pub fn new(client: HttpClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl ManifestSource for ManifestResolver {
    async fn resolve(&self, url: &str) -> ManifestResolution {
        let response = match self.client.get(url, self.timeout).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Manifest request to {} failed: {}", url, e);
                return ManifestResolution::problem("Erro de conexão ao baixar o bases.json.");
            }
        };

        if !response.is_ok() {
            let status = response.status.as_u16();
            tracing::warn!("Manifest request to {} returned {}", url, status);
            return ManifestResolution::problem(format!(
                "Não consegui baixar o bases.json (HTTP {}).",
                status
            ));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed reading manifest body from {}: {}", url, e);
                return ManifestResolution::problem("Erro de conexão ao baixar o bases.json.");
            }
        };

        // Some hosts prepend a BOM
        match serde_json::from_str::<Value>(body.trim_start_matches('\u{feff}')) {
            Ok(manifest) => {
                let resolution = parse_manifest(&manifest);
                tracing::info!(
                    "Manifest lists {} sources ({} configured)",
                    resolution.sources.len(),
                    resolution.sources.iter().filter(|s| !s.url.is_empty()).count()
                );
                resolution
            }
            Err(e) => {
                tracing::warn!("Manifest from {} is not valid JSON: {}", url, e);
                ManifestResolution::problem("O conteúdo do bases.json não é um JSON válido.")
            }
        }
    }
}

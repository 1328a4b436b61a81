//! Spreadsheet download and decoding.
//!
//! A fetch never fails outright: every outcome carries a [`FetchDiagnostics`]
//! record so the caller can report per-source status and move on to the next
//! source.

mod decode;
mod format;

pub use decode::{decode_table, decode_with_fallback, DecodeError, Decoded};
pub use format::{
    detect_format, filename_from_url, resolve_filename, DetectionBasis, SheetFormat,
    DEFAULT_FILENAME,
};

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::http_client::HttpClient;
use crate::models::Table;

/// Default timeout for a sheet download.
pub const DEFAULT_SHEET_TIMEOUT: Duration = Duration::from_secs(40);

/// What happened while fetching one sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchDiagnostics {
    pub url: String,
    pub http_status: Option<u16>,
    pub content_type: Option<String>,
    /// Filename hint from Content-Disposition or the URL.
    pub filename: Option<String>,
    /// MIME type sniffed from the body, when recognized.
    pub detected_mime: Option<String>,
    pub bytes: Option<usize>,
    pub detected_format: Option<SheetFormat>,
    pub detection_basis: Option<DetectionBasis>,
    /// Decoder that produced the table.
    pub decoder: Option<SheetFormat>,
    pub fell_back: bool,
    pub error: Option<String>,
}

impl FetchDiagnostics {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Default::default()
        }
    }

    fn failed(mut self, error: impl Into<String>) -> SheetOutcome {
        self.error = Some(error.into());
        SheetOutcome::Unavailable { diagnostics: self }
    }

    /// One-line human summary for status reports.
    pub fn summary(&self) -> String {
        if let Some(error) = &self.error {
            return match self.http_status {
                Some(status) => format!("HTTP {}: {}", status, error),
                None => error.clone(),
            };
        }
        match self.decoder {
            Some(decoder) if self.fell_back => format!("decoder: {} (fallback)", decoder),
            Some(decoder) => format!("decoder: {}", decoder),
            None => String::new(),
        }
    }
}

/// Result of fetching one sheet.
#[derive(Debug, Clone)]
pub enum SheetOutcome {
    Loaded {
        table: Table,
        diagnostics: FetchDiagnostics,
    },
    Unavailable {
        diagnostics: FetchDiagnostics,
    },
}

impl SheetOutcome {
    pub fn diagnostics(&self) -> &FetchDiagnostics {
        match self {
            Self::Loaded { diagnostics, .. } | Self::Unavailable { diagnostics } => diagnostics,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        self.diagnostics().filename.as_deref()
    }

    pub fn table(&self) -> Option<&Table> {
        match self {
            Self::Loaded { table, .. } => Some(table),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Anything that can turn a URL into a sheet outcome.
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch_sheet(&self, url: &str) -> SheetOutcome;
}

/// Downloads sheets over HTTP and decodes them.
#[derive(Clone)]
pub struct SpreadsheetFetcher {
    client: HttpClient,
    timeout: Duration,
}

impl SpreadsheetFetcher {
    pub fn new(client: HttpClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Download and decode the sheet at `url`.
    pub async fn fetch(&self, url: &str) -> SheetOutcome {
        let url = url.trim();
        let mut diagnostics = FetchDiagnostics::new(url);
        if url.is_empty() {
            return diagnostics.failed("empty URL");
        }

        let response = match self.client.get(url, self.timeout).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Sheet download failed for {}: {}", url, e);
                return diagnostics.failed(format!("request failed: {}", e));
            }
        };

        diagnostics.http_status = Some(response.status.as_u16());
        diagnostics.content_type = response.content_type().map(str::to_string);
        let filename = resolve_filename(response.content_disposition_filename(), url);
        diagnostics.filename = Some(filename.clone());

        if !response.is_ok() {
            tracing::warn!("Sheet download for {} returned {}", url, response.status);
            return diagnostics.failed("unexpected status");
        }

        let content = match response.bytes().await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed reading sheet body from {}: {}", url, e);
                return diagnostics.failed(format!("failed reading body: {}", e));
            }
        };

        diagnostics.bytes = Some(content.len());
        diagnostics.detected_mime = infer::get(&content).map(|t| t.mime_type().to_string());
        let (format, basis) = detect_format(&content, Some(&filename));
        diagnostics.detected_format = Some(format);
        diagnostics.detection_basis = Some(basis);

        match decode_with_fallback(&content, format) {
            Ok(decoded) => {
                tracing::info!(
                    "Decoded {} ({} rows) with {} decoder",
                    filename,
                    decoded.table.len(),
                    decoded.format
                );
                diagnostics.decoder = Some(decoded.format);
                diagnostics.fell_back = decoded.fell_back;
                SheetOutcome::Loaded {
                    table: decoded.table,
                    diagnostics,
                }
            }
            Err(e) => {
                tracing::warn!("Could not decode {} from {}: {}", filename, url, e);
                diagnostics.failed(e.to_string())
            }
        }
    }
}

#[async_trait]
impl SheetSource for SpreadsheetFetcher {
    async fn fetch_sheet(&self, url: &str) -> SheetOutcome {
        self.fetch(url).await
    }
}

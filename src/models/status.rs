//! Ingestion status report.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::utils::TIMESTAMP_FORMAT;

/// Outcome of ingesting one source sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseState {
    /// The manifest has no URL for this slot.
    #[serde(rename = "não configurada")]
    NotConfigured,
    /// Download or decode failed.
    #[serde(rename = "indisponível")]
    Unavailable,
    #[serde(rename = "ok")]
    Loaded,
    /// The sheet lacks required columns.
    #[serde(rename = "erro colunas")]
    ColumnError,
}

impl BaseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotConfigured => "não configurada",
            Self::Unavailable => "indisponível",
            Self::Loaded => "ok",
            Self::ColumnError => "erro colunas",
        }
    }
}

impl std::fmt::Display for BaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-source line of the status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStatus {
    pub label: String,
    pub status: BaseState,
    pub rows: usize,
    /// Resolved filename, `-` when unknown.
    pub filename: String,
    /// Free-text diagnostic (missing columns, decoder, fetch error).
    #[serde(default)]
    pub detail: String,
}

impl BaseStatus {
    pub fn new(label: impl Into<String>, status: BaseState) -> Self {
        Self {
            label: label.into(),
            status,
            rows: 0,
            filename: "-".to_string(),
            detail: String::new(),
        }
    }

    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_filename(mut self, filename: Option<&str>) -> Self {
        self.filename = filename
            .filter(|f| !f.is_empty())
            .unwrap_or("-")
            .to_string();
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }
}

/// Report written once per ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionStatus {
    /// Local time of the run, `YYYY-MM-DD HH:MM:SS`.
    pub updated_at: String,
    pub bases: Vec<BaseStatus>,
    pub total_rows: usize,
}

impl IngestionStatus {
    /// Stamp a report with the current local time.
    pub fn new(bases: Vec<BaseStatus>, total_rows: usize) -> Self {
        Self {
            updated_at: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            bases,
            total_rows,
        }
    }
}

impl std::fmt::Display for IngestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for base in &self.bases {
            writeln!(f, "{}", base.label)?;
            writeln!(f, "  Status: {}", base.status)?;
            writeln!(f, "  Linhas: {}", base.rows)?;
            writeln!(f, "  Arquivo: {}", base.filename)?;
            if !base.detail.is_empty() {
                writeln!(f, "  Detalhe: {}", base.detail)?;
            }
        }
        writeln!(f, "Total combinado: {}", self.total_rows)?;
        write!(f, "Atualizado em: {}", self.updated_at)
    }
}

//! Ingestion: fetch every configured source, validate, tag, and merge.

use crate::manifest::{SourceDescriptor, UNNAMED_LABEL};
use crate::models::{BaseState, BaseStatus, Dataset, IngestionStatus, REQUIRED_COLUMNS};
use crate::sheets::{SheetOutcome, SheetSource};
use crate::store::LocalStore;

/// Dataset and status report produced by one run.
#[derive(Debug, Clone)]
pub struct Ingestion {
    pub dataset: Dataset,
    pub status: IngestionStatus,
}

/// Runs sources through a [`SheetSource`] and persists the result.
pub struct IngestionPipeline<'a> {
    sheets: &'a dyn SheetSource,
    store: &'a LocalStore,
}

impl<'a> IngestionPipeline<'a> {
    pub fn new(sheets: &'a dyn SheetSource, store: &'a LocalStore) -> Self {
        Self { sheets, store }
    }

    /// Ingest `sources` in order and write the outcome to the store.
    ///
    /// Sources are fetched one after another. A failing source only
    /// affects its own status line.
    pub async fn run(&self, sources: &[SourceDescriptor]) -> Ingestion {
        let mut dataset = Dataset::new();
        let mut bases = Vec::with_capacity(sources.len());

        for source in sources {
            let status = self.ingest_source(source, &mut dataset).await;
            tracing::info!(
                "Source {}: {} ({} rows)",
                status.label,
                status.status,
                status.rows
            );
            bases.push(status);
        }

        let status = IngestionStatus::new(bases, dataset.len());
        if let Err(e) = self.store.save(&dataset, &status) {
            tracing::warn!(
                "Could not persist snapshot to {}: {}",
                self.store.dir().display(),
                e
            );
        }

        Ingestion { dataset, status }
    }

    async fn ingest_source(&self, source: &SourceDescriptor, dataset: &mut Dataset) -> BaseStatus {
        let label = if source.label.is_empty() {
            UNNAMED_LABEL
        } else {
            source.label.as_str()
        };
        let url = source.url.trim();
        if url.is_empty() {
            return BaseStatus::new(label, BaseState::NotConfigured);
        }

        let outcome = self.sheets.fetch_sheet(url).await;
        let diagnostics = outcome.diagnostics();
        let base = BaseStatus::new(label, BaseState::Unavailable).with_filename(outcome.filename());

        let table = match &outcome {
            SheetOutcome::Loaded { table, .. } => table,
            SheetOutcome::Unavailable { .. } => return base.with_detail(diagnostics.summary()),
        };

        let missing = table.missing_columns(&REQUIRED_COLUMNS);
        if !missing.is_empty() {
            tracing::warn!("Source {} is missing required columns {:?}", label, missing);
            return BaseStatus {
                status: BaseState::ColumnError,
                ..base
            }
            .with_detail(format!("Colunas obrigatórias ausentes: {}", missing.join(", ")));
        }

        let rows = dataset.append_table(table, label);
        BaseStatus {
            status: BaseState::Loaded,
            ..base
        }
        .with_rows(rows)
        .with_detail(diagnostics.summary())
    }
}

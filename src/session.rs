//! Top-level flow: use the local snapshot, or ingest when there is none.

use crate::enrich::{enrich, EnrichedRow};
use crate::ingest::IngestionPipeline;
use crate::manifest::ManifestSource;
use crate::models::{Dataset, IngestionStatus};
use crate::sheets::SheetSource;
use crate::store::{LocalStore, StoreError};

/// Shown when there is nothing to query and no manifest problem to report.
pub const NO_DATA_MESSAGE: &str =
    "Nenhuma base disponível no momento. Verifique o bases.json no SharePoint.";

/// Remote collaborators used when the snapshot has to be rebuilt.
pub struct Remote<'a> {
    pub manifest: &'a dyn ManifestSource,
    pub manifest_url: &'a str,
    pub sheets: &'a dyn SheetSource,
}

/// State available to one user interaction.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub dataset: Option<Dataset>,
    pub status: Option<IngestionStatus>,
    /// Manifest problem, set only when no dataset could be produced.
    pub banner: Option<String>,
    /// Whether this session ran ingestion rather than reading the snapshot.
    pub ingested: bool,
}

impl Session {
    /// Terminal message when there is nothing to query.
    pub fn halt_reason(&self) -> Option<String> {
        match &self.dataset {
            Some(dataset) if !dataset.is_empty() => None,
            _ => Some(
                self.banner
                    .clone()
                    .unwrap_or_else(|| NO_DATA_MESSAGE.to_string()),
            ),
        }
    }

    /// Enriched rows for querying, empty when there is no dataset.
    pub fn enriched(&self) -> Vec<EnrichedRow> {
        self.dataset.as_ref().map(enrich).unwrap_or_default()
    }

    /// Status report, or a partial summary when only the dataset exists.
    pub fn status_summary(&self) -> String {
        match (&self.status, &self.dataset) {
            (Some(status), _) => status.to_string(),
            (None, Some(dataset)) if !dataset.is_empty() => format!(
                "Linhas (total): {}\nStatus parcial (sem detalhes por base).",
                dataset.len()
            ),
            _ => "Nenhuma base disponível.".to_string(),
        }
    }
}

/// Open a session from the snapshot, ingesting only when it is absent.
pub async fn open_session(store: &LocalStore, remote: &Remote<'_>) -> Session {
    if let Some(dataset) = store.load() {
        return Session {
            dataset: Some(dataset),
            status: store.read_status(),
            banner: None,
            ingested: false,
        };
    }

    tracing::info!("No usable snapshot, resolving {}", remote.manifest_url);
    let resolution = remote.manifest.resolve(remote.manifest_url).await;
    let ingestion = IngestionPipeline::new(remote.sheets, store)
        .run(&resolution.sources)
        .await;

    let banner = match resolution.problem {
        Some(problem) if ingestion.dataset.is_empty() => {
            Some(format!("Erro ao carregar ponteiro (bases.json): {}", problem))
        }
        _ => None,
    };

    Session {
        dataset: (!ingestion.dataset.is_empty()).then_some(ingestion.dataset),
        status: Some(ingestion.status),
        banner,
        ingested: true,
    }
}

/// Drop the snapshot and ingest again.
pub async fn refresh(store: &LocalStore, remote: &Remote<'_>) -> Result<Session, StoreError> {
    store.clear()?;
    Ok(open_session(store, remote).await)
}

//! Local snapshot of the merged dataset and its status report.
//!
//! The snapshot lives in two files under the data directory:
//! `base_atual.csv` (tagged rows with a header line) and `status.json`
//! (the [`IngestionStatus`] of the run that produced it). Once present, the
//! snapshot is authoritative until [`LocalStore::clear`] removes it.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::models::{is_core_column, Dataset, IngestionStatus, Intervention, REQUIRED_COLUMNS};
use crate::utils::{format_timestamp, parse_timestamp};

pub const DATASET_FILE: &str = "base_atual.csv";
pub const STATUS_FILE: &str = "status.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not replace snapshot file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Handle on a snapshot directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.dir.join(DATASET_FILE)
    }

    pub fn status_path(&self) -> PathBuf {
        self.dir.join(STATUS_FILE)
    }

    /// Load the persisted dataset.
    ///
    /// Returns `None` when there is no snapshot or it can't be parsed.
    /// Never touches the network.
    pub fn load(&self) -> Option<Dataset> {
        let path = self.dataset_path();
        if !path.exists() {
            tracing::debug!("No snapshot at {}", path.display());
            return None;
        }
        match read_dataset(&path) {
            Ok(dataset) => {
                tracing::info!("Loaded {} rows from {}", dataset.len(), path.display());
                Some(dataset)
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable snapshot {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Persist a run. The status is always written, the dataset only when
    /// it has rows.
    pub fn save(&self, dataset: &Dataset, status: &IngestionStatus) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;

        if !dataset.is_empty() {
            self.write_atomic(&self.dataset_path(), |file| write_dataset(file, dataset))?;
        }
        self.write_atomic(&self.status_path(), |file| {
            serde_json::to_writer_pretty(file, status)?;
            Ok(())
        })?;

        tracing::info!(
            "Saved snapshot ({} rows) to {}",
            dataset.len(),
            self.dir.display()
        );
        Ok(())
    }

    /// The persisted status report, if present and readable.
    pub fn read_status(&self) -> Option<IngestionStatus> {
        let path = self.status_path();
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(status) => Some(status),
            Err(e) => {
                tracing::warn!("Ignoring unreadable status report {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Delete both snapshot files.
    pub fn clear(&self) -> Result<(), StoreError> {
        for path in [self.dataset_path(), self.status_path()] {
            match fs::remove_file(&path) {
                Ok(()) => tracing::info!("Removed {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Write to a temp file in the store directory, then rename over `path`.
    fn write_atomic<F>(&self, path: &Path, write: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut File) -> Result<(), StoreError>,
    {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        write(tmp.as_file_mut())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;
        Ok(())
    }
}

fn write_dataset(file: &mut File, dataset: &Dataset) -> Result<(), StoreError> {
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(dataset.columns())?;

    let timestamp = |ts: &Option<chrono::NaiveDateTime>| {
        ts.as_ref().map(format_timestamp).unwrap_or_default()
    };
    for row in &dataset.rows {
        let mut record = vec![
            row.num_interv.clone(),
            row.rodovia.clone(),
            row.tipo.clone(),
            timestamp(&row.inicio),
            timestamp(&row.data_fim),
            row.sentido.clone(),
            row.trecho.clone().unwrap_or_default(),
            row.executor.clone(),
            row.base.clone(),
        ];
        record.extend(
            dataset
                .extra_columns
                .iter()
                .map(|column| row.extra.get(column).cloned().unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_dataset(path: &Path) -> Result<Dataset, StoreError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| !headers.iter().any(|h| h == *name))
        .collect();
    if !missing.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("snapshot is missing columns {:?}", missing),
        )
        .into());
    }

    let mut dataset = Dataset::new();
    dataset.register_columns(headers.iter());

    for record in reader.records() {
        let record = record?;
        let field = |name: &str| column_value(&headers, &record, name).to_string();
        let timestamp = |name: &str| {
            let raw = column_value(&headers, &record, name).trim();
            if raw.is_empty() {
                None
            } else {
                parse_timestamp(raw)
            }
        };
        let trecho = field("Trecho");

        let extra: BTreeMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .filter(|(column, value)| !is_core_column(column) && !value.trim().is_empty())
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();

        dataset.rows.push(Intervention {
            num_interv: field("Num Interv"),
            rodovia: field("Rodovia"),
            tipo: field("Tipo"),
            inicio: timestamp("Inicio"),
            data_fim: timestamp("DataFim"),
            sentido: field("Sentido"),
            trecho: (!trecho.trim().is_empty()).then_some(trecho),
            executor: field("Executor"),
            base: field("Base"),
            extra,
        });
    }

    Ok(dataset)
}

fn column_value<'r>(headers: &StringRecord, record: &'r StringRecord, name: &str) -> &'r str {
    headers
        .iter()
        .position(|h| h == name)
        .and_then(|idx| record.get(idx))
        .unwrap_or_default()
}

//! Intervention rows and the merged dataset.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use super::table::{Record, Table};

/// Columns every programming sheet must carry.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "Num Interv",
    "Rodovia",
    "Tipo",
    "Inicio",
    "DataFim",
    "Sentido",
    "Trecho",
    "Executor",
];

/// Provenance column added during the merge.
pub const BASE_COLUMN: &str = "Base";

/// One scheduled intervention, tagged with the source it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Intervention {
    pub num_interv: String,
    pub rodovia: String,
    pub tipo: String,
    pub inicio: Option<NaiveDateTime>,
    pub data_fim: Option<NaiveDateTime>,
    pub sentido: String,
    /// Raw `"start - end"` segment, absent when the cell was blank.
    pub trecho: Option<String>,
    pub executor: String,
    /// Label of the source sheet.
    pub base: String,
    /// Non-blank passthrough cells, rendered as text.
    pub extra: BTreeMap<String, String>,
}

impl Intervention {
    /// Build a tagged row from a validated sheet record.
    pub fn from_record(record: &Record<'_>, base: &str) -> Self {
        let extra = record
            .iter()
            .filter(|(column, _)| !is_core_column(column))
            .filter_map(|(column, cell)| cell.text().map(|value| (column.to_string(), value)))
            .collect();

        Self {
            num_interv: record.get("Num Interv").render(),
            rodovia: record.get("Rodovia").render(),
            tipo: record.get("Tipo").render(),
            inicio: record.get("Inicio").as_timestamp(),
            data_fim: record.get("DataFim").as_timestamp(),
            sentido: record.get("Sentido").render(),
            trecho: record.get("Trecho").text(),
            executor: record.get("Executor").render(),
            base: base.to_string(),
            extra,
        }
    }
}

/// Required columns plus `Base`; everything else is passthrough.
pub fn is_core_column(column: &str) -> bool {
    column == BASE_COLUMN || REQUIRED_COLUMNS.contains(&column)
}

/// The merged intervention table from one ingestion run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Passthrough column names in first-seen order.
    pub extra_columns: Vec<String>,
    pub rows: Vec<Intervention>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append every row of a validated table, tagged with `label`.
    /// Returns the number of rows appended.
    pub fn append_table(&mut self, table: &Table, label: &str) -> usize {
        self.register_columns(table.columns.iter().map(String::as_str));
        let before = self.rows.len();
        self.rows
            .extend(table.records().map(|record| Intervention::from_record(&record, label)));
        self.rows.len() - before
    }

    /// Record passthrough column names, keeping first-seen order.
    pub fn register_columns<'a>(&mut self, columns: impl IntoIterator<Item = &'a str>) {
        for column in columns {
            if !is_core_column(column) && !self.extra_columns.iter().any(|c| c == column) {
                self.extra_columns.push(column.to_string());
            }
        }
    }

    /// Full column list as persisted: required columns, `Base`, passthrough.
    pub fn columns(&self) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(std::iter::once(BASE_COLUMN.to_string()))
            .chain(self.extra_columns.iter().cloned())
            .collect()
    }
}

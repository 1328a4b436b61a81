//! Derived fields used for filtering and sorting.

use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::km::split_segment;
use crate::models::{Dataset, Intervention};

/// Coarse shift classification from the start hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    /// Starts at exactly 07h.
    Diurno,
    /// Starts at exactly 22h.
    Noturno,
    Outro,
}

impl Period {
    /// Exact-hour match, not a range.
    pub fn from_time(time: Option<NaiveTime>) -> Self {
        match time.map(|t| t.hour()) {
            Some(7) => Self::Diurno,
            Some(22) => Self::Noturno,
            _ => Self::Outro,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diurno => "Diurno",
            Self::Noturno => "Noturno",
            Self::Outro => "Outro",
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tagged row plus the fields derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    pub row: Intervention,
    /// Calendar date of `Inicio`.
    pub data: Option<NaiveDate>,
    /// Time of day of `Inicio`.
    pub hora: Option<NaiveTime>,
    pub periodo: Period,
    pub km_inicial: Option<String>,
    pub km_final: Option<String>,
    pub km_ini_num: Option<f64>,
    pub km_fim_num: Option<f64>,
}

impl EnrichedRow {
    pub fn from_row(row: Intervention) -> Self {
        let data = row.inicio.map(|dt| dt.date());
        let hora = row.inicio.map(|dt| dt.time());
        let segment = split_segment(row.trecho.as_deref());
        Self {
            data,
            hora,
            periodo: Period::from_time(hora),
            km_inicial: segment.start_display,
            km_final: segment.end_display,
            km_ini_num: segment.start_km,
            km_fim_num: segment.end_km,
            row,
        }
    }
}

/// Derive fields for every row, keeping order and cardinality.
pub fn enrich(dataset: &Dataset) -> Vec<EnrichedRow> {
    dataset.rows.iter().cloned().map(EnrichedRow::from_row).collect()
}

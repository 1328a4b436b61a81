//! Data models for sheets, interventions, and ingestion reports.

mod intervention;
mod status;
mod table;

pub use intervention::{is_core_column, Dataset, Intervention, BASE_COLUMN, REQUIRED_COLUMNS};
pub use status::{BaseState, BaseStatus, IngestionStatus};
pub use table::{Cell, Record, Table};

//! Shared utility functions.
//!
//! - `dates`: timestamp parsing/formatting for sheet and snapshot cells
//! - `text`: small string helpers (titleizing keys, number rendering)

mod dates;
mod text;

pub use dates::{format_timestamp, parse_date, parse_timestamp, DATE_FORMAT, TIMESTAMP_FORMAT};
pub use text::{format_number, titleize};

//! Roadworks - intervention number lookup over weekly programming sheets.
//!
//! Resolves the current and next week's programming spreadsheets from a
//! `bases.json` manifest, merges them into a local snapshot, and answers
//! point queries (highway, service type, date, direction, contractor,
//! period) against it.

pub mod config;
pub mod enrich;
pub mod http_client;
pub mod ingest;
pub mod km;
pub mod manifest;
pub mod models;
pub mod query;
pub mod session;
pub mod sheets;
pub mod store;
pub mod utils;

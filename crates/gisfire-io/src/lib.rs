//! # gisfire-io: CSV Files & Data API Client
//!
//! Everything that touches bytes outside the process.
//!
//! ### Data API ([`client`])
//! - [`client::MeteocatClient`] - blocking basic-auth HTTP client implementing
//!   [`gisfire_core::DataApi`]
//!
//! ### CSV Schemas
//! - [`reports`] - firefighter incident reports (input of matching)
//! - [`matched`] - matched lightnings (`id,meteocat_id,date-UTC,...`)
//! - [`examples`] - example feature files (`ID,DATE,PEAK_CURRENT,...`)
//! - [`tables`] - plain header + rows writer for reports and matrices
//!
//! All readers return `anyhow::Result` with the offending path in the error
//! context.

pub mod client;
pub mod examples;
pub mod matched;
pub mod reports;
pub mod tables;

pub use client::MeteocatClient;
pub use examples::{read_feature_rows, read_feature_table, write_feature_rows, FeatureTable};
pub use matched::{read_matched, write_matched, MatchedLightningRecord};
pub use reports::{read_firefighter_reports, ReportLoad};
pub use tables::write_table;

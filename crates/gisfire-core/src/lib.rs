//! # gisfire-core: Lightning Ignition Domain Core
//!
//! Data model and the one real algorithm of the gisfire workspace: the
//! spatiotemporal matcher that pairs a firefighter report with the strike
//! most likely to have caused it.
//!
//! ## Data Model
//!
//! - [`Lightning`] - a strike record as served by the data API
//! - [`FirefighterReport`] - a report time and planar location
//! - [`MeasureKind`] / [`Window`] - the weather measurement catalogue
//! - [`FeatureRow`] - one flat example record (one CSV line)
//!
//! All coordinates are planar metres (EPSG:25831 by default); all
//! timestamps are UTC.
//!
//! ## Matching
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use gisfire_core::*;
//!
//! let report = FirefighterReport::new(
//!     Utc.with_ymd_and_hms(2019, 7, 2, 12, 0, 0).unwrap(),
//!     Point::new(400_000.0, 4_600_000.0),
//! );
//! let strike = Lightning {
//!     date: Utc.with_ymd_and_hms(2019, 7, 2, 9, 0, 0).unwrap(),
//!     location: Point::new(400_300.0, 4_600_400.0),
//!     ..Lightning::with_id(LightningId::new(7))
//! };
//!
//! let config = MatcherConfig::default();
//! let found = select_match(&report, &[strike], &config, |_| Ok(Some(LandCover::new(211))))
//!     .expect("strike within range");
//! assert_eq!(found.lightning.id.value(), 7);
//! ```
//!
//! ## Data API Seam
//!
//! [`DataApi`] abstracts the remote read-only API. `gisfire-io` provides the
//! HTTP implementation; tests use in-memory fakes.

pub mod api;
pub mod error;
pub mod feature;
pub mod matcher;
pub mod measure;
pub mod model;
pub mod time;

pub use api::DataApi;
pub use error::{GisfireError, GisfireResult};
pub use feature::{FeatureRow, FEATURE_BASE_COLUMNS};
pub use matcher::{
    rank_candidates, select_match, spatiotemporal_distance, trailing_window_days, Match,
    MatcherConfig, ScoredCandidate,
};
pub use measure::{
    measure_columns, measure_pairs, Aggregation, MeasureKind, Window, MEASURES_PER_EXAMPLE,
};
pub use model::{FirefighterReport, LandCover, Lightning, LightningId, Point};
pub use time::{format_utc, parse_utc};

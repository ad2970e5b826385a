//! # gisfire-algo: Dataset Pipelines & Learning
//!
//! ## Pipelines
//!
//! Each pipeline walks its input sequentially, one blocking [`DataApi`]
//! request at a time. Per-record failures are logged and counted; they never
//! abort a run.
//!
//! - [`matching::match_reports`] - firefighter reports to causing strikes
//! - [`sampling::fill_positive`] - feature rows for matched strikes
//! - [`sampling::fill_negative`] - same-day ground strikes without a fire
//! - [`sampling::fill_other_negative`] - strikes from days without any fire
//!
//! ## Learning
//!
//! [`learn`] fits and evaluates the ignition classifier on the example files.
//!
//! [`DataApi`]: gisfire_core::DataApi

pub mod features;
pub mod learn;
pub mod matching;
pub mod sampling;

#[cfg(test)]
pub(crate) mod fake;

pub use features::{assemble_features, Assembly, FeatureRequirements, SkipReason};
pub use learn::LearnConfig;
pub use matching::{match_reports, MatchSummary};
pub use sampling::{
    fill_negative, fill_other_negative, fill_positive, FillOutcome, FillSummary, SamplingConfig,
};

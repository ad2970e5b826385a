pub mod api;
pub mod completions;
pub mod fill;
pub mod learn;
pub mod matching;
pub mod telemetry;

//! Configuration file
//!
//! Every section and field is optional; missing values take the defaults
//! below. Command-line flags override the file.
//!
//! ```toml
//! [api]
//! host = "https://example.org/api/v1"
//! username = "analyst"
//! srid = 25831
//!
//! [matcher]
//! max_distance = 15000.0
//! report_utc_offset_hours = 1
//!
//! [sampling]
//! seed = 1234567890
//! start = "2014-01-01"
//!
//! [learn]
//! folds = 5
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{Context, Result};
use gisfire_algo::{LearnConfig, SamplingConfig};
use gisfire_core::MatcherConfig;
use gisfire_io::client::DEFAULT_SRID;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GisfireConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub matcher: MatcherSection,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub learn: LearnConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GisfireConfig {
    /// Read `path`, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    /// Spatial reference of requested coordinates
    #[serde(default = "default_srid")]
    pub srid: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: None,
            username: None,
            token: None,
            srid: default_srid(),
        }
    }
}

fn default_srid() -> u32 {
    DEFAULT_SRID
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherSection {
    #[serde(default = "default_max_distance")]
    pub max_distance: f64,
    #[serde(default = "default_time_divisor")]
    pub time_divisor: f64,
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    /// Firefighter report times are local civil time at this UTC offset.
    #[serde(default = "default_report_utc_offset_hours")]
    pub report_utc_offset_hours: i32,
}

impl Default for MatcherSection {
    fn default() -> Self {
        Self {
            max_distance: default_max_distance(),
            time_divisor: default_time_divisor(),
            window_days: default_window_days(),
            report_utc_offset_hours: default_report_utc_offset_hours(),
        }
    }
}

impl MatcherSection {
    pub fn matcher(&self) -> MatcherConfig {
        MatcherConfig {
            max_distance: self.max_distance,
            time_divisor: self.time_divisor,
            window_days: self.window_days,
        }
    }
}

fn default_max_distance() -> f64 {
    MatcherConfig::default().max_distance
}

fn default_time_divisor() -> f64 {
    MatcherConfig::default().time_divisor
}

fn default_window_days() -> u32 {
    MatcherConfig::default().window_days
}

fn default_report_utc_offset_hours() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    /// Parsed level; unknown names fall back to `info`.
    pub fn level(&self) -> tracing::Level {
        self.level.parse().unwrap_or(tracing::Level::INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_file_gives_defaults() {
        let config: GisfireConfig = toml::from_str("").unwrap();
        assert_eq!(config.api.srid, 25831);
        assert_eq!(config.matcher.matcher(), MatcherConfig::default());
        assert_eq!(config.matcher.report_utc_offset_hours, 1);
        assert_eq!(config.sampling, SamplingConfig::default());
        assert_eq!(config.learn.folds, 5);
        assert_eq!(config.logging.level(), tracing::Level::INFO);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: GisfireConfig = toml::from_str(
            r#"
            [api]
            host = "https://example.org/api/v1"

            [matcher]
            window_days = 3

            [sampling]
            per_example = 4
            start = "2016-05-01"

            [learn]
            drop_columns = ["HIT_GROUND"]

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.host.as_deref(), Some("https://example.org/api/v1"));
        assert_eq!(config.matcher.window_days, 3);
        assert_eq!(config.matcher.max_distance, 15_000.0);
        assert_eq!(config.sampling.per_example, 4);
        assert_eq!(config.sampling.seed, 1_234_567_890);
        assert_eq!(
            config.sampling.start,
            NaiveDate::from_ymd_opt(2016, 5, 1).unwrap()
        );
        assert_eq!(config.learn.drop_columns, vec!["HIT_GROUND"]);
        assert_eq!(
            config.learn.correlation_drop_columns,
            gisfire_algo::learn::correlation_drop_columns()
        );
        assert!(config
            .learn
            .study_drop_columns
            .contains(&"AVG_TEMPERATURE_3_DAY".to_string()));
        assert_eq!(config.learn.max_step, 10);
        assert_eq!(config.logging.level(), tracing::Level::DEBUG);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GisfireConfig::load(Some(&dir.path().join("gisfire.toml"))).unwrap_err();
        assert!(err.to_string().contains("gisfire.toml"));
    }
}

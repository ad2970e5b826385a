use chrono::{DateTime, Utc};

use crate::measure::{measure_columns, MEASURES_PER_EXAMPLE};
use crate::model::{LandCover, Lightning, LightningId};

/// Leading columns of every example file, before the measurements.
pub const FEATURE_BASE_COLUMNS: [&str; 8] = [
    "ID",
    "DATE",
    "PEAK_CURRENT",
    "CHI_SQUARED",
    "NUMBER_OF_SENSORS",
    "HIT_GROUND",
    "DISCHARGES",
    "LAND_COVER",
];

/// One example: strike attributes, land cover and the 30 weather
/// measurements. Unlabelled; the label comes from the file it lands in.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub id: LightningId,
    pub date: DateTime<Utc>,
    pub peak_current: f64,
    pub chi_squared: f64,
    pub number_of_sensors: i32,
    pub hit_ground: bool,
    pub discharges: i64,
    pub land_cover: LandCover,
    /// In [`measure_columns`] order; `None` when the station had no data.
    pub measures: Vec<Option<f64>>,
}

impl FeatureRow {
    pub fn new(
        lightning: &Lightning,
        discharges: i64,
        land_cover: LandCover,
        measures: Vec<Option<f64>>,
    ) -> Self {
        Self {
            id: lightning.id,
            date: lightning.date,
            peak_current: lightning.peak_current,
            chi_squared: lightning.chi_squared,
            number_of_sensors: lightning.number_of_sensors,
            hit_ground: lightning.hit_ground,
            discharges,
            land_cover,
            measures,
        }
    }

    /// Full header row of an example file.
    pub fn header() -> Vec<String> {
        FEATURE_BASE_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(measure_columns())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.measures.len() == MEASURES_PER_EXAMPLE
    }
}

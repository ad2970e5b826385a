use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::flexible_utc;

/// Strike identifier assigned by the data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LightningId(i64);

impl LightningId {
    #[inline]
    pub fn new(value: i64) -> Self {
        LightningId(value)
    }
    #[inline]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for LightningId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Planar coordinates in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Land cover code at a strike location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandCover(i32);

impl LandCover {
    /// Lowest accepted code (exclusive).
    pub const MIN_EXCLUSIVE: i32 = 0;
    /// Highest accepted code (exclusive). Codes from 300 up are water and
    /// unclassified surfaces.
    pub const MAX_EXCLUSIVE: i32 = 300;

    #[inline]
    pub fn new(code: i32) -> Self {
        LandCover(code)
    }
    #[inline]
    pub fn code(&self) -> i32 {
        self.0
    }

    pub fn is_accepted(&self) -> bool {
        self.0 > Self::MIN_EXCLUSIVE && self.0 < Self::MAX_EXCLUSIVE
    }
}

/// A lightning strike as served by the data API.
///
/// Field names follow the API JSON so the struct deserializes directly from a
/// response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lightning {
    pub id: LightningId,
    /// Identifier in the upstream meteorological network. Served as a string
    /// or a number depending on the record vintage.
    #[serde(default, deserialize_with = "crate::time::string_or_number")]
    pub meteocat_id: Option<String>,
    #[serde(with = "flexible_utc")]
    pub date: DateTime<Utc>,
    #[serde(flatten, with = "coordinates")]
    pub location: Point,
    pub peak_current: f64,
    pub chi_squared: f64,
    pub number_of_sensors: i32,
    pub hit_ground: bool,
}

impl Lightning {
    /// Placeholder strike with the given id, meant for struct update syntax in
    /// tests and doc examples.
    pub fn with_id(id: LightningId) -> Self {
        Self {
            id,
            meteocat_id: None,
            date: DateTime::<Utc>::default(),
            location: Point::default(),
            peak_current: 0.0,
            chi_squared: 0.0,
            number_of_sensors: 0,
            hit_ground: true,
        }
    }
}

/// A firefighter incident report: when and where a fire was attended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirefighterReport {
    pub date: DateTime<Utc>,
    pub location: Point,
}

impl FirefighterReport {
    pub fn new(date: DateTime<Utc>, location: Point) -> Self {
        Self { date, location }
    }
}

/// `coordinates_x` / `coordinates_y` <-> [`Point`].
mod coordinates {
    use super::Point;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Raw {
        coordinates_x: f64,
        coordinates_y: f64,
    }

    pub fn serialize<S>(point: &Point, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Raw {
            coordinates_x: point.x,
            coordinates_y: point.y,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Point, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Raw::deserialize(deserializer)?;
        Ok(Point::new(raw.coordinates_x, raw.coordinates_y))
    }
}

//! Read-only data API seam.
//!
//! Every lookup distinguishes three outcomes:
//! - `Ok(Some(_))`: the API answered 200 with a usable body
//! - `Ok(None)`: the API answered with any other status (treated as missing)
//! - `Err(_)`: transport or decoding failure
//!
//! Callers decide per field whether missing is fatal for the record or just
//! a null cell.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::GisfireResult;
use crate::measure::{MeasureKind, Window};
use crate::model::{LandCover, Lightning, LightningId, Point};

pub trait DataApi {
    /// A single strike by id.
    fn lightning(&self, id: LightningId) -> GisfireResult<Option<Lightning>>;

    /// All strikes recorded on a calendar day (UTC).
    fn lightnings_on(&self, day: NaiveDate) -> GisfireResult<Option<Vec<Lightning>>>;

    /// Number of discharges grouped under a strike.
    fn discharge_count(&self, id: LightningId) -> GisfireResult<Option<i64>>;

    fn land_cover(&self, id: LightningId) -> GisfireResult<Option<LandCover>>;

    /// Code of the weather station closest to `location` that was active at
    /// `date`.
    fn nearest_station(
        &self,
        date: DateTime<Utc>,
        location: Point,
    ) -> GisfireResult<Option<String>>;

    /// One measurement at `station`, instantaneous or aggregated over the
    /// trailing `window`.
    fn measure(
        &self,
        station: &str,
        kind: MeasureKind,
        window: Window,
        date: DateTime<Utc>,
    ) -> GisfireResult<Option<f64>>;
}

impl<T: DataApi + ?Sized> DataApi for &T {
    fn lightning(&self, id: LightningId) -> GisfireResult<Option<Lightning>> {
        (**self).lightning(id)
    }

    fn lightnings_on(&self, day: NaiveDate) -> GisfireResult<Option<Vec<Lightning>>> {
        (**self).lightnings_on(day)
    }

    fn discharge_count(&self, id: LightningId) -> GisfireResult<Option<i64>> {
        (**self).discharge_count(id)
    }

    fn land_cover(&self, id: LightningId) -> GisfireResult<Option<LandCover>> {
        (**self).land_cover(id)
    }

    fn nearest_station(
        &self,
        date: DateTime<Utc>,
        location: Point,
    ) -> GisfireResult<Option<String>> {
        (**self).nearest_station(date, location)
    }

    fn measure(
        &self,
        station: &str,
        kind: MeasureKind,
        window: Window,
        date: DateTime<Utc>,
    ) -> GisfireResult<Option<f64>> {
        (**self).measure(station, kind, window, date)
    }
}

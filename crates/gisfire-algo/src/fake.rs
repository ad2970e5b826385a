//! In-memory [`DataApi`] for pipeline tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use gisfire_core::{
    DataApi, GisfireError, GisfireResult, LandCover, Lightning, LightningId, MeasureKind, Point,
    Window,
};

#[derive(Default)]
pub struct FakeApi {
    pub strikes: HashMap<LightningId, Lightning>,
    pub days: HashMap<NaiveDate, Vec<LightningId>>,
    pub discharges: HashMap<LightningId, i64>,
    pub land_covers: HashMap<LightningId, LandCover>,
    /// Strikes whose land cover lookup fails at transport level.
    pub broken: HashSet<LightningId>,
    /// Days whose listing fails at transport level.
    pub broken_days: HashSet<NaiveDate>,
    pub station: Option<String>,
    /// Measurements answered with a missing value, for every station and date.
    pub missing: HashSet<(MeasureKind, Window)>,
    /// Measurement requests in call order.
    pub calls: RefCell<Vec<(MeasureKind, Window)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            station: Some("XC".into()),
            ..Default::default()
        }
    }

    /// Register a strike with one discharge and land cover 211.
    pub fn add(&mut self, strike: Lightning) {
        let id = strike.id;
        self.days.entry(strike.date.date_naive()).or_default().push(id);
        self.discharges.insert(id, 1);
        self.land_covers.insert(id, LandCover::new(211));
        self.strikes.insert(id, strike);
    }

    pub fn measure_calls(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl DataApi for FakeApi {
    fn lightning(&self, id: LightningId) -> GisfireResult<Option<Lightning>> {
        Ok(self.strikes.get(&id).cloned())
    }

    fn lightnings_on(&self, day: NaiveDate) -> GisfireResult<Option<Vec<Lightning>>> {
        if self.broken_days.contains(&day) {
            return Err(GisfireError::Http("connection reset".into()));
        }
        Ok(self.days.get(&day).map(|ids| {
            ids.iter()
                .filter_map(|id| self.strikes.get(id).cloned())
                .collect()
        }))
    }

    fn discharge_count(&self, id: LightningId) -> GisfireResult<Option<i64>> {
        Ok(self.discharges.get(&id).copied())
    }

    fn land_cover(&self, id: LightningId) -> GisfireResult<Option<LandCover>> {
        if self.broken.contains(&id) {
            return Err(GisfireError::Http("connection reset".into()));
        }
        Ok(self.land_covers.get(&id).copied())
    }

    fn nearest_station(
        &self,
        _date: DateTime<Utc>,
        _location: Point,
    ) -> GisfireResult<Option<String>> {
        Ok(self.station.clone())
    }

    fn measure(
        &self,
        _station: &str,
        kind: MeasureKind,
        window: Window,
        _date: DateTime<Utc>,
    ) -> GisfireResult<Option<f64>> {
        self.calls.borrow_mut().push((kind, window));
        if self.missing.contains(&(kind, window)) {
            return Ok(None);
        }
        Ok(Some(f64::from(window.days()) + 0.5))
    }
}

/// Ground strike `id` at `hour` on 2019-07-`day`, `dx` metres east of the
/// reference point.
pub fn strike(id: i64, day: u32, hour: u32, dx: f64) -> Lightning {
    Lightning {
        date: Utc.with_ymd_and_hms(2019, 7, day, hour, 0, 0).unwrap(),
        location: Point::new(400_000.0 + dx, 4_600_000.0),
        peak_current: -10.0 - id as f64,
        chi_squared: 1.0,
        number_of_sensors: 4,
        ..Lightning::with_id(LightningId::new(id))
    }
}

pub fn day(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 7, day).unwrap()
}

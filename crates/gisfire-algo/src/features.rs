//! Feature assembly: one strike in, one example row out.
//!
//! The discharge count, land cover and nearest station are required. The 30
//! measurements are not: a missing reading becomes an empty cell, unless the
//! [`FeatureRequirements`] say the kind must be complete.

use std::fmt;

use gisfire_core::{
    measure_pairs, DataApi, FeatureRow, GisfireResult, LandCover, Lightning, MeasureKind, Window,
    MEASURES_PER_EXAMPLE,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Extra checks a strike must pass to become an example.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRequirements {
    /// Reject strikes whose land cover is outside the accepted range.
    pub land_cover_in_range: bool,
    /// Reject strikes missing the longest-window value of these kinds.
    pub complete_kinds: Vec<MeasureKind>,
}

impl FeatureRequirements {
    /// Positives were already vetted by the matcher.
    pub fn positive() -> Self {
        Self::default()
    }

    pub fn negative() -> Self {
        Self {
            land_cover_in_range: true,
            complete_kinds: vec![
                MeasureKind::RelHumidity,
                MeasureKind::Temperature,
                MeasureKind::Rain,
            ],
        }
    }
}

/// Why a strike produced no example.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoDischargeCount,
    NoLandCover,
    LandCoverOutOfRange(LandCover),
    NoStation,
    MissingMeasure(MeasureKind),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoDischargeCount => write!(f, "no discharge count"),
            SkipReason::NoLandCover => write!(f, "no land cover"),
            SkipReason::LandCoverOutOfRange(cover) => {
                write!(f, "land cover {} out of range", cover.code())
            }
            SkipReason::NoStation => write!(f, "no nearby weather station"),
            SkipReason::MissingMeasure(kind) => {
                write!(f, "missing {} over {} days", kind.code(), Window::LONGEST.days())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Assembly {
    Row(FeatureRow),
    Skipped(SkipReason),
}

/// Build the example row for `lightning`.
///
/// Requests are issued in column order and stop at the first rejection.
/// Transport failures are returned as errors.
pub fn assemble_features<A: DataApi>(
    api: &A,
    lightning: &Lightning,
    requirements: &FeatureRequirements,
) -> GisfireResult<Assembly> {
    let Some(discharges) = api.discharge_count(lightning.id)? else {
        return Ok(Assembly::Skipped(SkipReason::NoDischargeCount));
    };
    let Some(land_cover) = api.land_cover(lightning.id)? else {
        return Ok(Assembly::Skipped(SkipReason::NoLandCover));
    };
    if requirements.land_cover_in_range && !land_cover.is_accepted() {
        return Ok(Assembly::Skipped(SkipReason::LandCoverOutOfRange(
            land_cover,
        )));
    }
    let Some(station) = api.nearest_station(lightning.date, lightning.location)? else {
        return Ok(Assembly::Skipped(SkipReason::NoStation));
    };
    debug!(id = %lightning.id, station = %station, "collecting measurements");

    let mut measures = Vec::with_capacity(MEASURES_PER_EXAMPLE);
    for (kind, window) in measure_pairs() {
        let value = api.measure(&station, kind, window, lightning.date)?;
        measures.push(value);
        if window == Window::LONGEST
            && value.is_none()
            && requirements.complete_kinds.contains(&kind)
        {
            return Ok(Assembly::Skipped(SkipReason::MissingMeasure(kind)));
        }
    }

    Ok(Assembly::Row(FeatureRow::new(
        lightning, discharges, land_cover, measures,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{strike, FakeApi};

    fn api_with_strike() -> (FakeApi, Lightning) {
        let mut api = FakeApi::new();
        let s = strike(1, 2, 10, 0.0);
        api.add(s.clone());
        (api, s)
    }

    #[test]
    fn row_has_all_measures_in_column_order() {
        let (api, s) = api_with_strike();
        let Assembly::Row(row) =
            assemble_features(&api, &s, &FeatureRequirements::positive()).unwrap()
        else {
            panic!("expected a row");
        };
        assert_eq!(row.measures.len(), MEASURES_PER_EXAMPLE);
        assert_eq!(row.measures[0], Some(0.5));
        assert_eq!(row.measures[5], Some(15.5));
        assert_eq!(row.discharges, 1);
        assert_eq!(api.measure_calls(), MEASURES_PER_EXAMPLE);
        let calls = api.calls.borrow();
        assert_eq!(calls[0], (MeasureKind::RelHumidity, Window::INSTANT));
        assert_eq!(calls[29], (MeasureKind::Wind, Window::LONGEST));
    }

    #[test]
    fn missing_measures_become_null_cells() {
        let (mut api, s) = api_with_strike();
        api.missing.insert((MeasureKind::Wind, Window::LONGEST));
        api.missing.insert((MeasureKind::Rain, Window::INSTANT));
        let Assembly::Row(row) =
            assemble_features(&api, &s, &FeatureRequirements::positive()).unwrap()
        else {
            panic!("expected a row");
        };
        assert_eq!(row.measures[12], None);
        assert_eq!(row.measures[29], None);
        assert_eq!(row.measures.iter().filter(|m| m.is_none()).count(), 2);
    }

    #[test]
    fn required_lookups_skip_the_strike() {
        let (mut api, s) = api_with_strike();
        api.station = None;
        assert_eq!(
            assemble_features(&api, &s, &FeatureRequirements::positive()).unwrap(),
            Assembly::Skipped(SkipReason::NoStation)
        );

        api.discharges.clear();
        assert_eq!(
            assemble_features(&api, &s, &FeatureRequirements::positive()).unwrap(),
            Assembly::Skipped(SkipReason::NoDischargeCount)
        );
        assert_eq!(api.measure_calls(), 0);
    }

    #[test]
    fn negatives_require_accepted_land_cover() {
        let (mut api, s) = api_with_strike();
        api.land_covers.insert(s.id, LandCover::new(512));
        assert!(matches!(
            assemble_features(&api, &s, &FeatureRequirements::positive()).unwrap(),
            Assembly::Row(_)
        ));
        assert_eq!(
            assemble_features(&api, &s, &FeatureRequirements::negative()).unwrap(),
            Assembly::Skipped(SkipReason::LandCoverOutOfRange(LandCover::new(512)))
        );
    }

    #[test]
    fn incomplete_kind_stops_further_requests() {
        let (mut api, s) = api_with_strike();
        api.missing.insert((MeasureKind::Temperature, Window::LONGEST));
        assert_eq!(
            assemble_features(&api, &s, &FeatureRequirements::negative()).unwrap(),
            Assembly::Skipped(SkipReason::MissingMeasure(MeasureKind::Temperature))
        );
        assert_eq!(api.measure_calls(), 12);
    }

    #[test]
    fn transport_errors_propagate() {
        let (mut api, s) = api_with_strike();
        api.broken.insert(s.id);
        assert!(assemble_features(&api, &s, &FeatureRequirements::positive()).is_err());
    }
}

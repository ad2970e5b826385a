//! Spatiotemporal nearest-neighbour matching of firefighter reports to
//! lightning strikes.
//!
//! **Metric.** For a report at `(x_r, y_r, t_r)` and a strike at
//! `(x_s, y_s, t_s)` with `t_s < t_r`:
//!
//! ```text
//! d = sqrt((x_r - x_s)² + (y_r - y_s)² + ((t_r - t_s) / divisor)²)
//! ```
//!
//! with `Δt` in seconds. The default divisor of 3600 weighs one hour of
//! elapsed time like one metre of planar distance.
//!
//! **Selection.** Candidates are ranked by `d` ascending (ties by strike id)
//! and tested in order. A candidate is rejected when `d` exceeds the
//! threshold, when its land cover is unknown or cannot be looked up, or when
//! the code lies outside the accepted range. The first survivor is the match.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::GisfireResult;
use crate::model::{FirefighterReport, LandCover, Lightning};

/// Matcher tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Largest accepted spatiotemporal distance.
    pub max_distance: f64,
    /// Seconds per unit of the time axis.
    pub time_divisor: f64,
    /// Number of calendar days searched, the report's own day included.
    pub window_days: u32,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_distance: 15_000.0,
            time_divisor: 3_600.0,
            window_days: 6,
        }
    }
}

/// A candidate strike together with its distance to the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub lightning: &'a Lightning,
    pub distance: f64,
}

/// Result of a successful match.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub lightning: Lightning,
    pub distance: f64,
    pub land_cover: LandCover,
}

/// Distance between a report and a strike, or `None` when the strike did
/// not happen strictly before the report.
pub fn spatiotemporal_distance(
    report: &FirefighterReport,
    strike: &Lightning,
    time_divisor: f64,
) -> Option<f64> {
    let elapsed = report.date.signed_duration_since(strike.date);
    let elapsed_secs = elapsed.num_milliseconds() as f64 / 1000.0;
    if elapsed_secs <= 0.0 {
        return None;
    }
    let dx = report.location.x - strike.location.x;
    let dy = report.location.y - strike.location.y;
    let dt = elapsed_secs / time_divisor;
    Some((dx * dx + dy * dy + dt * dt).sqrt())
}

/// Eligible candidates sorted by ascending distance.
pub fn rank_candidates<'a>(
    report: &FirefighterReport,
    candidates: &'a [Lightning],
    config: &MatcherConfig,
) -> Vec<ScoredCandidate<'a>> {
    let mut scored: Vec<ScoredCandidate<'a>> = candidates
        .iter()
        .filter_map(|lightning| {
            spatiotemporal_distance(report, lightning, config.time_divisor)
                .map(|distance| ScoredCandidate { lightning, distance })
        })
        .collect();
    // Stable sort: equal (distance, id) pairs keep their input order.
    scored.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.lightning.id.cmp(&b.lightning.id))
    });
    scored
}

/// Pick the closest acceptable strike for `report`.
///
/// `land_cover` is only called for candidates within the distance
/// threshold, in ranking order. A lookup that answers nothing or fails
/// rejects that candidate and the next one is tried.
pub fn select_match<F>(
    report: &FirefighterReport,
    candidates: &[Lightning],
    config: &MatcherConfig,
    mut land_cover: F,
) -> Option<Match>
where
    F: FnMut(&Lightning) -> GisfireResult<Option<LandCover>>,
{
    for candidate in rank_candidates(report, candidates, config) {
        if candidate.distance > config.max_distance {
            // Ranked ascending: nothing further can pass.
            break;
        }
        let cover = match land_cover(candidate.lightning) {
            Ok(Some(cover)) => cover,
            Ok(None) => continue,
            Err(e) => {
                warn!(strike = %candidate.lightning.id, error = %e, "land cover lookup failed");
                continue;
            }
        };
        if !cover.is_accepted() {
            continue;
        }
        return Some(Match {
            lightning: candidate.lightning.clone(),
            distance: candidate.distance,
            land_cover: cover,
        });
    }
    None
}

/// Calendar days (UTC) searched for a report: its own day first, then the
/// `window_days - 1` preceding days.
pub fn trailing_window_days(report_time: DateTime<Utc>, window_days: u32) -> Vec<NaiveDate> {
    let day = report_time.date_naive();
    (0..window_days)
        .map(|offset| day - Duration::days(i64::from(offset)))
        .collect()
}

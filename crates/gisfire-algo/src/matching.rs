//! Matching firefighter reports to the strikes that caused them.

use std::collections::HashMap;

use chrono::NaiveDate;
use gisfire_core::{
    select_match, trailing_window_days, DataApi, FirefighterReport, GisfireResult, Lightning,
    MatcherConfig,
};
use gisfire_io::MatchedLightningRecord;
use serde::Serialize;
use tracing::{info, warn};

/// Outcome counts of a matching run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchSummary {
    pub reports: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub failed: usize,
}

/// Day listings of the current window. Reports are processed in time order,
/// so days older than the window being built are never asked for again and
/// are dropped.
struct DayCache<'a, A> {
    api: &'a A,
    days: HashMap<NaiveDate, Vec<Lightning>>,
}

impl<'a, A: DataApi> DayCache<'a, A> {
    fn new(api: &'a A) -> Self {
        Self {
            api,
            days: HashMap::new(),
        }
    }

    /// Strikes of `days`, which run from the newest day back to the oldest.
    fn window(&mut self, days: &[NaiveDate]) -> GisfireResult<Vec<Lightning>> {
        if let Some(earliest) = days.last() {
            self.days.retain(|day, _| day >= earliest);
        }
        let mut strikes = Vec::new();
        for day in days {
            if !self.days.contains_key(day) {
                // A day the API has no listing for holds no strikes.
                let listing = self.api.lightnings_on(*day)?.unwrap_or_default();
                self.days.insert(*day, listing);
            }
            if let Some(listing) = self.days.get(day) {
                strikes.extend(listing.iter().cloned());
            }
        }
        Ok(strikes)
    }
}

/// Match every report to its most likely strike.
///
/// Reports are handled in chronological order. A report without an eligible
/// strike is skipped. A failed land cover lookup only rejects that candidate;
/// a failed day listing skips the whole report.
pub fn match_reports<A: DataApi>(
    api: &A,
    reports: &[FirefighterReport],
    config: &MatcherConfig,
) -> (Vec<MatchedLightningRecord>, MatchSummary) {
    let mut ordered: Vec<&FirefighterReport> = reports.iter().collect();
    ordered.sort_by_key(|report| report.date);

    let mut cache = DayCache::new(api);
    let mut records = Vec::new();
    let mut summary = MatchSummary {
        reports: reports.len(),
        ..Default::default()
    };

    for (n, report) in ordered.into_iter().enumerate() {
        let days = trailing_window_days(report.date, config.window_days);
        let outcome = cache.window(&days).map(|candidates| {
            select_match(report, &candidates, config, |strike| api.land_cover(strike.id))
        });
        match outcome {
            Ok(Some(found)) => {
                info!(
                    report = n + 1,
                    of = summary.reports,
                    strike = %found.lightning.id,
                    distance = found.distance,
                    "matched"
                );
                records.push(MatchedLightningRecord::new(&found, report));
                summary.matched += 1;
            }
            Ok(None) => {
                warn!(report = n + 1, date = %report.date, "no strike within range");
                summary.unmatched += 1;
            }
            Err(e) => {
                warn!(report = n + 1, date = %report.date, error = %e, "day listing failed, skipping report");
                summary.failed += 1;
            }
        }
    }
    (records, summary)
}

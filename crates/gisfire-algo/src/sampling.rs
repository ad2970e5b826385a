//! Positive and negative example sampling.
//!
//! Positives are the matched strikes. Negatives are ground strikes that no
//! report was matched to, drawn either from the days of the positives or from
//! days without any fire. All shuffling uses one seeded generator per run, so
//! a run is reproducible given the same API answers.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use gisfire_core::{DataApi, FeatureRow, Lightning, LightningId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::features::{assemble_features, Assembly, FeatureRequirements};

/// Negative sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub seed: u64,
    /// Negatives wanted per positive example.
    pub per_example: usize,
    /// Days with fewer ground strikes are not sampled from.
    pub min_strikes_per_day: usize,
    /// First day (inclusive) searched for fire-free days.
    pub start: NaiveDate,
    /// Last day (exclusive) searched for fire-free days.
    pub end: NaiveDate,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            seed: 1_234_567_890,
            per_example: 10,
            min_strikes_per_day: 10,
            start: NaiveDate::from_ymd_opt(2014, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
        }
    }
}

/// Outcome counts of a fill run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FillSummary {
    pub produced: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Assembled rows and their counts.
#[derive(Debug, Clone, Default)]
pub struct FillOutcome {
    pub rows: Vec<FeatureRow>,
    pub summary: FillSummary,
}

impl FillOutcome {
    /// Assemble `strike` and record the outcome. Returns true when a row was
    /// added.
    fn try_add<A: DataApi>(
        &mut self,
        api: &A,
        strike: &Lightning,
        requirements: &FeatureRequirements,
    ) -> bool {
        match assemble_features(api, strike, requirements) {
            Ok(Assembly::Row(row)) => {
                self.rows.push(row);
                self.summary.produced += 1;
                true
            }
            Ok(Assembly::Skipped(reason)) => {
                debug!(id = %strike.id, %reason, "skipping strike");
                self.summary.skipped += 1;
                false
            }
            Err(e) => {
                warn!(id = %strike.id, error = %e, "feature lookup failed");
                self.summary.failed += 1;
                false
            }
        }
    }
}

/// Feature rows for the matched strikes, in input order.
pub fn fill_positive<A: DataApi>(
    api: &A,
    ids: &[LightningId],
    requirements: &FeatureRequirements,
) -> FillOutcome {
    let mut outcome = FillOutcome::default();
    for (n, id) in ids.iter().enumerate() {
        info!(record = n + 1, of = ids.len(), %id, "positive example");
        let strike = match api.lightning(*id) {
            Ok(Some(strike)) => strike,
            Ok(None) => {
                warn!(%id, "strike not found");
                outcome.summary.skipped += 1;
                continue;
            }
            Err(e) => {
                warn!(%id, error = %e, "strike lookup failed");
                outcome.summary.failed += 1;
                continue;
            }
        };
        if !outcome.try_add(api, &strike, requirements) {
            warn!(%id, "no example for matched strike");
        }
    }
    outcome
}

fn ground_hits(listing: Vec<Lightning>, excluded: &HashSet<LightningId>) -> Vec<Lightning> {
    listing
        .into_iter()
        .filter(|s| s.hit_ground && !excluded.contains(&s.id))
        .collect()
}

/// Negatives drawn from the same UTC day as each positive.
///
/// Candidates are that day's ground strikes, excluding positives and strikes
/// already sampled, in seeded random order. Up to `per_example` negatives
/// passing [`FeatureRequirements::negative`] are kept per positive.
pub fn fill_negative<A: DataApi>(
    api: &A,
    positives: &[FeatureRow],
    config: &SamplingConfig,
) -> FillOutcome {
    let requirements = FeatureRequirements::negative();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut excluded: HashSet<LightningId> = positives.iter().map(|p| p.id).collect();
    let mut outcome = FillOutcome::default();

    for (n, positive) in positives.iter().enumerate() {
        let day = positive.date.date_naive();
        let listing = match api.lightnings_on(day) {
            Ok(listing) => listing.unwrap_or_default(),
            Err(e) => {
                warn!(%day, error = %e, "day listing failed");
                outcome.summary.failed += 1;
                continue;
            }
        };
        let mut candidates = ground_hits(listing, &excluded);
        candidates.shuffle(&mut rng);

        let mut kept = 0;
        for candidate in &candidates {
            if kept == config.per_example {
                break;
            }
            if outcome.try_add(api, candidate, &requirements) {
                excluded.insert(candidate.id);
                kept += 1;
            }
        }
        info!(
            positive = n + 1,
            of = positives.len(),
            %day,
            kept,
            "same-day negatives"
        );
    }
    outcome
}

/// Negatives drawn from days in `[start, end)` without any positive.
///
/// Days are visited in seeded random order. Days with fewer than
/// `min_strikes_per_day` ground strikes are passed over. Sampling stops once
/// `positives × per_example` negatives exist.
pub fn fill_other_negative<A: DataApi>(
    api: &A,
    positives: &[FeatureRow],
    config: &SamplingConfig,
) -> FillOutcome {
    let requirements = FeatureRequirements::negative();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let fire_days: BTreeSet<NaiveDate> = positives.iter().map(|p| p.date.date_naive()).collect();
    let target = positives.len() * config.per_example;
    let mut outcome = FillOutcome::default();

    let mut days: Vec<NaiveDate> = config
        .start
        .iter_days()
        .take_while(|day| *day < config.end)
        .filter(|day| !fire_days.contains(day))
        .collect();
    days.shuffle(&mut rng);
    info!(days = days.len(), target, "sampling fire-free days");

    let no_exclusions = HashSet::new();
    for day in days {
        if outcome.rows.len() >= target {
            break;
        }
        let listing = match api.lightnings_on(day) {
            Ok(listing) => listing.unwrap_or_default(),
            Err(e) => {
                warn!(%day, error = %e, "day listing failed");
                outcome.summary.failed += 1;
                continue;
            }
        };
        let mut candidates = ground_hits(listing, &no_exclusions);
        if candidates.len() < config.min_strikes_per_day {
            debug!(%day, ground_hits = candidates.len(), "too few ground strikes");
            continue;
        }
        candidates.shuffle(&mut rng);

        let mut kept = 0;
        for candidate in &candidates {
            if kept == config.per_example || outcome.rows.len() >= target {
                break;
            }
            if outcome.try_add(api, candidate, &requirements) {
                kept += 1;
            }
        }
        info!(%day, kept, total = outcome.rows.len(), target, "fire-free day");
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{day, strike, FakeApi};
    use gisfire_core::{LandCover, MeasureKind, Window};

    fn config(per_example: usize) -> SamplingConfig {
        SamplingConfig {
            per_example,
            min_strikes_per_day: 3,
            start: day(1),
            end: day(11),
            ..Default::default()
        }
    }

    fn positive(api: &FakeApi, id: i64) -> FeatureRow {
        let strike = api.strikes[&LightningId::new(id)].clone();
        FeatureRow::new(&strike, 1, LandCover::new(211), vec![None; 30])
    }

    fn ids(rows: &[FeatureRow]) -> Vec<i64> {
        rows.iter().map(|r| r.id.value()).collect()
    }

    #[test]
    fn positives_follow_input_order_and_skip_missing() {
        let mut api = FakeApi::new();
        api.add(strike(1, 2, 8, 0.0));
        api.add(strike(2, 3, 8, 0.0));
        let wanted = [LightningId::new(2), LightningId::new(99), LightningId::new(1)];

        let outcome = fill_positive(&api, &wanted, &FeatureRequirements::positive());
        assert_eq!(ids(&outcome.rows), vec![2, 1]);
        assert_eq!(outcome.summary.skipped, 1);
    }

    #[test]
    fn same_day_negatives_exclude_positives_and_cloud_strikes() {
        let mut api = FakeApi::new();
        for id in 1..=6 {
            api.add(strike(id, 2, id as u32, 0.0));
        }
        let mut cloud = strike(7, 2, 9, 0.0);
        cloud.hit_ground = false;
        api.add(cloud);
        api.add(strike(8, 3, 9, 0.0));

        let positives = vec![positive(&api, 1)];
        let outcome = fill_negative(&api, &positives, &config(10));
        let mut got = ids(&outcome.rows);
        got.sort();
        assert_eq!(got, vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn same_day_negatives_are_capped_and_not_repeated() {
        let mut api = FakeApi::new();
        for id in 1..=8 {
            api.add(strike(id, 2, id as u32, 0.0));
        }
        let positives = vec![positive(&api, 1), positive(&api, 2)];
        let outcome = fill_negative(&api, &positives, &config(3));
        let got = ids(&outcome.rows);
        assert_eq!(got.len(), 6);
        let unique: HashSet<i64> = got.iter().copied().collect();
        assert_eq!(unique.len(), 6);
        assert!(!unique.contains(&1) && !unique.contains(&2));
    }

    #[test]
    fn negatives_failing_requirements_are_replaced() {
        let mut api = FakeApi::new();
        for id in 1..=4 {
            api.add(strike(id, 2, id as u32, 0.0));
        }
        api.land_covers.insert(LightningId::new(2), LandCover::new(400));
        let positives = vec![positive(&api, 1)];
        let outcome = fill_negative(&api, &positives, &config(10));
        let mut got = ids(&outcome.rows);
        got.sort();
        assert_eq!(got, vec![3, 4]);
        assert_eq!(outcome.summary.skipped, 1);
    }

    #[test]
    fn sampling_is_reproducible() {
        let mut api = FakeApi::new();
        for id in 1..=20 {
            api.add(strike(id, 2, (id % 24) as u32, 0.0));
        }
        let positives = vec![positive(&api, 1)];
        let first = fill_negative(&api, &positives, &config(4));
        let second = fill_negative(&api, &positives, &config(4));
        assert_eq!(ids(&first.rows), ids(&second.rows));
    }

    #[test]
    fn other_negatives_avoid_fire_days_and_sparse_days() {
        let mut api = FakeApi::new();
        // Day 2 holds the positive, day 4 is too sparse, day 6 qualifies.
        for id in 1..=4 {
            api.add(strike(id, 2, id as u32, 0.0));
        }
        api.add(strike(10, 4, 1, 0.0));
        api.add(strike(11, 4, 2, 0.0));
        for id in 20..=24 {
            api.add(strike(id, 6, (id - 19) as u32, 0.0));
        }
        let positives = vec![positive(&api, 1)];

        let outcome = fill_other_negative(&api, &positives, &config(10));
        let mut got = ids(&outcome.rows);
        got.sort();
        assert_eq!(got, vec![20, 21, 22, 23, 24]);
    }

    #[test]
    fn cloud_strikes_do_not_make_a_day_dense() {
        let mut api = FakeApi::new();
        api.add(strike(1, 1, 1, 0.0));
        for h in 0..12 {
            let mut s = strike(i64::from(30 + h), 3, h, 0.0);
            s.hit_ground = h < 2;
            api.add(s);
        }
        let config = SamplingConfig {
            min_strikes_per_day: 10,
            ..config(10)
        };
        let outcome = fill_other_negative(&api, &[positive(&api, 1)], &config);
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.summary.produced, 0);
    }

    #[test]
    fn other_negatives_stop_at_target() {
        let mut api = FakeApi::new();
        api.add(strike(1, 1, 1, 0.0));
        for d in 2..=9 {
            for h in 0..5 {
                api.add(strike(i64::from(d * 10 + h), d, h, 0.0));
            }
        }
        let positives = vec![positive(&api, 1)];
        let outcome = fill_other_negative(&api, &positives, &config(3));
        assert_eq!(outcome.rows.len(), 3);
        let days: HashSet<NaiveDate> = outcome.rows.iter().map(|r| r.date.date_naive()).collect();
        assert_eq!(days.len(), 1);
    }

    #[test]
    fn other_negatives_need_complete_weather() {
        let mut api = FakeApi::new();
        api.add(strike(1, 1, 1, 0.0));
        for h in 0..4 {
            api.add(strike(i64::from(50 + h), 5, h, 0.0));
        }
        api.missing.insert((MeasureKind::Rain, Window::LONGEST));
        let outcome = fill_other_negative(&api, &[positive(&api, 1)], &config(10));
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.summary.skipped, 4);
    }
}

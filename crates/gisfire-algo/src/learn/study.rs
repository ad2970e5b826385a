//! Negative subsampling study.
//!
//! For each step `s` in `1..=max_step`, every `s`-th row of each negative
//! file is kept, the data is prepared as for a single fit (with the study's
//! own drop list) and the training split is cross-validated. The last step also reports the held-out test
//! split under test point `-1`.

use std::ops::Range;

use anyhow::{bail, Result};
use gisfire_io::FeatureTable;
use tracing::info;

use super::dataset::Samples;
use super::logistic::LogisticRegression;
use super::metrics::{Confusion, Scores};
use super::{prepare, LearnConfig};

pub const STUDY_HEADER: [&str; 9] = [
    "TEST_POINT",
    "TN",
    "FP",
    "FN",
    "TP",
    "FN_RATIO",
    "PRECISION",
    "RECALL",
    "F_SCORE",
];

/// Test point of the final held-out evaluation.
pub const HELD_OUT: i64 = -1;

#[derive(Debug, Clone, PartialEq)]
pub struct StudyRow {
    /// Subsampling step, or [`HELD_OUT`].
    pub test_point: i64,
    pub scores: Scores,
}

impl StudyRow {
    pub fn to_record(&self) -> Vec<String> {
        let s = &self.scores;
        vec![
            self.test_point.to_string(),
            s.tn.to_string(),
            s.fp.to_string(),
            s.fn_.to_string(),
            s.tp.to_string(),
            s.fn_ratio.to_string(),
            s.precision.to_string(),
            s.recall.to_string(),
            s.f_score.to_string(),
        ]
    }
}

/// Contiguous, unshuffled folds. The first `n % k` folds hold one extra row.
pub fn kfold_ranges(n: usize, k: usize) -> Result<Vec<Range<usize>>> {
    if k < 2 {
        bail!("cross validation needs at least 2 folds, got {k}");
    }
    if n < k {
        bail!("cannot split {n} samples into {k} folds");
    }
    let base = n / k;
    let extra = n % k;
    let mut start = 0;
    Ok((0..k)
        .map(|fold| {
            let size = base + usize::from(fold < extra);
            let range = start..start + size;
            start += size;
            range
        })
        .collect())
}

/// Confusion matrix of each fold's held-out rows.
pub fn cross_validate(samples: &Samples, folds: usize) -> Result<Vec<Confusion>> {
    kfold_ranges(samples.len(), folds)?
        .into_iter()
        .map(|range| -> Result<Confusion> {
            let (train, held) = samples.hold_out(range);
            let model = LogisticRegression::fit(&train.x, &train.y)?;
            Ok(Confusion::from_labels(&held.y, &model.predict(&held.x)))
        })
        .collect()
}

pub fn run_study(
    positive: &FeatureTable,
    negatives: &[&FeatureTable],
    config: &LearnConfig,
) -> Result<Vec<StudyRow>> {
    let mut rows = Vec::new();
    for step in 1..=config.max_step {
        let prepared = prepare(positive, negatives, config, &config.study_drop_columns, step)?;
        let folds = cross_validate(&prepared.train, config.folds)?;
        let scores = Scores::average(&folds);
        info!(
            step,
            train = prepared.train.len(),
            recall = scores.recall,
            precision = scores.precision,
            "cross validated"
        );
        rows.push(StudyRow {
            test_point: step as i64,
            scores,
        });

        if step == config.max_step {
            let model = LogisticRegression::fit(&prepared.train.x, &prepared.train.y)?;
            let predicted = model.predict(&prepared.test.x);
            rows.push(StudyRow {
                test_point: HELD_OUT,
                scores: Confusion::from_labels(&prepared.test.y, &predicted).scores(),
            });
        }
    }
    Ok(rows)
}

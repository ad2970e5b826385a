//! Learning on the example files.
//!
//! The three example files (positives, same-day negatives, fire-free-day
//! negatives) are concatenated, cleaned and split before a logistic
//! regression is fitted:
//!
//! 1. label rows by file (`FIRE` = 1 for positives, 0 otherwise)
//! 2. drop the configured columns, then rows with any missing cell
//! 3. remap `LAND_COVER` codes to dense indices
//! 4. seeded shuffle split into train and test
//! 5. drop `ID` and `DATE`
//!
//! [`study`] repeats this while subsampling the negatives and
//! cross-validates each step; [`correlation`] reports pairwise correlation of
//! the cleaned columns.

pub mod correlation;
pub mod dataset;
pub mod logistic;
pub mod metrics;
pub mod study;

use anyhow::Result;
use gisfire_core::{MeasureKind, Window};
use gisfire_io::FeatureTable;
use serde::{Deserialize, Serialize};
use tracing::info;

pub use correlation::{correlation_matrix, CorrelationMatrix};
pub use dataset::{subsample, LabeledTable, Samples};
pub use logistic::LogisticRegression;
pub use metrics::{Confusion, Scores};
pub use study::{kfold_ranges, run_study, StudyRow, STUDY_HEADER};

/// Learning parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnConfig {
    pub seed: u64,
    /// Share of the examples used for training; the rest is held out.
    pub train_fraction: f64,
    /// Cross-validation folds of the study.
    pub folds: usize,
    /// Largest negative subsampling step of the study.
    pub max_step: usize,
    /// Columns removed before a single fit.
    pub drop_columns: Vec<String>,
    /// Columns removed before each study step.
    pub study_drop_columns: Vec<String>,
    /// Columns removed before computing the correlation matrix.
    pub correlation_drop_columns: Vec<String>,
}

impl Default for LearnConfig {
    fn default() -> Self {
        Self {
            seed: 1_234_567_890,
            train_fraction: 0.8,
            folds: 5,
            max_step: 10,
            drop_columns: default_drop_columns(),
            study_drop_columns: study_drop_columns(),
            correlation_drop_columns: correlation_drop_columns(),
        }
    }
}

/// Sensor metadata, long humidity/temperature/rain windows, and every solar
/// irradiance and wind column.
pub fn default_drop_columns() -> Vec<String> {
    let mut columns = correlation_drop_columns();
    for kind in [
        MeasureKind::RelHumidity,
        MeasureKind::Temperature,
        MeasureKind::Rain,
    ] {
        columns.extend(Window::ALL[3..].iter().map(|w| kind.column(*w)));
    }
    columns
}

/// The fit list plus the 3-day temperature average.
pub fn study_drop_columns() -> Vec<String> {
    let mut columns = default_drop_columns();
    columns.push(MeasureKind::Temperature.column(Window::ALL[2]));
    columns
}

/// Sensor metadata and every solar irradiance and wind column. Humidity,
/// temperature and rain keep all their windows.
pub fn correlation_drop_columns() -> Vec<String> {
    let mut columns = vec!["NUMBER_OF_SENSORS".to_string(), "HIT_GROUND".to_string()];
    for kind in [MeasureKind::SolarIrradiance, MeasureKind::Wind] {
        columns.extend(Window::ALL.iter().map(|w| kind.column(*w)));
    }
    columns
}

/// Train/test samples ready for fitting.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub train: Samples,
    pub test: Samples,
    /// Rows dropped for missing cells.
    pub incomplete: usize,
}

/// Run the cleaning steps on the example files, removing `drop_columns` and
/// keeping every `step`-th negative.
pub fn prepare(
    positive: &FeatureTable,
    negatives: &[&FeatureTable],
    config: &LearnConfig,
    drop_columns: &[String],
    step: usize,
) -> Result<Prepared> {
    let subsampled: Vec<FeatureTable> = negatives.iter().map(|t| subsample(t, step)).collect();
    let mut sources = vec![(positive, true)];
    sources.extend(subsampled.iter().map(|t| (t, false)));

    let mut table = LabeledTable::concat(&sources)?;
    table.drop_columns(drop_columns)?;
    let incomplete = table.drop_incomplete_rows();
    table.remap_dense("LAND_COVER")?;
    let (train, test) = table.split(config.train_fraction, config.seed);
    Ok(Prepared {
        train: train.into_samples()?,
        test: test.into_samples()?,
        incomplete,
    })
}

/// Held-out evaluation of one fitted model.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub model: LogisticRegression,
    pub columns: Vec<String>,
    pub confusion: Confusion,
    pub train_rows: usize,
    pub test_rows: usize,
    pub incomplete: usize,
}

/// Fit on the training split and score the test split.
pub fn fit(
    positive: &FeatureTable,
    negatives: &[&FeatureTable],
    config: &LearnConfig,
) -> Result<Evaluation> {
    let prepared = prepare(positive, negatives, config, &config.drop_columns, 1)?;
    info!(
        train = prepared.train.len(),
        test = prepared.test.len(),
        incomplete = prepared.incomplete,
        "fitting logistic regression"
    );
    let model = LogisticRegression::fit(&prepared.train.x, &prepared.train.y)?;
    let predicted = model.predict(&prepared.test.x);
    Ok(Evaluation {
        confusion: Confusion::from_labels(&prepared.test.y, &predicted),
        columns: prepared.train.columns.clone(),
        train_rows: prepared.train.len(),
        test_rows: prepared.test.len(),
        incomplete: prepared.incomplete,
        model,
    })
}

use std::fs;
use std::io::{self, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use gisfire_algo::learn::{self, correlation_matrix, run_study, Evaluation, STUDY_HEADER};
use gisfire_algo::LearnConfig;
use gisfire_cli::{ExampleFiles, GisfireConfig, LearnCommands};
use gisfire_io::{read_feature_table, write_table, FeatureTable};
use serde_json::json;
use tabwriter::TabWriter;
use tracing::info;

use super::telemetry::record_run_timed;

struct Tables {
    positive: FeatureTable,
    negative: FeatureTable,
    negative_other: FeatureTable,
}

impl Tables {
    fn load(files: &ExampleFiles) -> Result<Self> {
        let tables = Self {
            positive: read_feature_table(&files.positive_file)?,
            negative: read_feature_table(&files.negative_file)?,
            negative_other: read_feature_table(&files.negative_other_file)?,
        };
        info!(
            positive = tables.positive.len(),
            negative = tables.negative.len(),
            negative_other = tables.negative_other.len(),
            "loaded example files"
        );
        Ok(tables)
    }

    fn negatives(&self) -> [&FeatureTable; 2] {
        [&self.negative, &self.negative_other]
    }
}

pub fn handle(command: &LearnCommands, config: &GisfireConfig) -> Result<()> {
    match command {
        LearnCommands::Fit {
            files,
            seed,
            report,
        } => {
            let mut learn_config = config.learn.clone();
            if let Some(seed) = seed {
                learn_config.seed = *seed;
            }
            let tables = Tables::load(files)?;
            let evaluation = learn::fit(&tables.positive, &tables.negatives(), &learn_config)?;
            print_evaluation(&evaluation)?;

            if let Some(path) = report {
                let seed = learn_config.seed.to_string();
                let start = Instant::now();
                let res = write_report(path, &evaluation, &learn_config);
                record_run_timed(path, "learn fit", &[("seed", seed.as_str())], start, &res);
                res?;
            }
            Ok(())
        }
        LearnCommands::Study {
            files,
            results_file,
            seed,
            max_step,
            folds,
        } => {
            let mut learn_config = config.learn.clone();
            if let Some(seed) = seed {
                learn_config.seed = *seed;
            }
            if let Some(max_step) = max_step {
                learn_config.max_step = *max_step;
            }
            if let Some(folds) = folds {
                learn_config.folds = *folds;
            }
            let seed = learn_config.seed.to_string();
            let steps = learn_config.max_step.to_string();
            let k = learn_config.folds.to_string();
            let start = Instant::now();
            let res = (|| -> Result<()> {
                let tables = Tables::load(files)?;
                let rows = run_study(&tables.positive, &tables.negatives(), &learn_config)?;
                let records: Vec<Vec<String>> = rows.iter().map(|r| r.to_record()).collect();
                write_table(results_file, &STUDY_HEADER, &records)?;
                println!(
                    "Wrote {} study rows to {}",
                    records.len(),
                    results_file.display()
                );
                Ok(())
            })();
            record_run_timed(
                results_file,
                "learn study",
                &[
                    ("seed", seed.as_str()),
                    ("max_step", steps.as_str()),
                    ("folds", k.as_str()),
                ],
                start,
                &res,
            );
            res
        }
        LearnCommands::Correlation {
            files,
            results_file,
        } => {
            let start = Instant::now();
            let res = (|| -> Result<()> {
                let tables = Tables::load(files)?;
                let [negative, negative_other] = tables.negatives();
                let matrix = correlation_matrix(
                    &[&tables.positive, negative, negative_other],
                    config.learn.correlation_drop_columns.as_slice(),
                )?;
                write_table(results_file, &matrix.header(), &matrix.to_records())?;
                println!(
                    "Wrote {}x{} correlation matrix to {}",
                    matrix.columns.len(),
                    matrix.columns.len(),
                    results_file.display()
                );
                Ok(())
            })();
            record_run_timed(results_file, "learn correlation", &[], start, &res);
            res
        }
    }
}

fn print_evaluation(evaluation: &Evaluation) -> Result<()> {
    let c = &evaluation.confusion;
    let s = c.scores();
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "TRAIN\tTEST\tDROPPED")?;
    writeln!(
        writer,
        "{}\t{}\t{}",
        evaluation.train_rows, evaluation.test_rows, evaluation.incomplete
    )?;
    writeln!(writer)?;
    writeln!(writer, "TN\tFP\tFN\tTP")?;
    writeln!(writer, "{}\t{}\t{}\t{}", c.tn, c.fp, c.fn_, c.tp)?;
    writeln!(writer)?;
    writeln!(writer, "PRECISION\tRECALL\tF_SCORE\tFN_RATIO")?;
    writeln!(
        writer,
        "{:.4}\t{:.4}\t{:.4}\t{:.4}",
        s.precision, s.recall, s.f_score, s.fn_ratio
    )?;
    writer.flush()?;
    Ok(())
}

fn write_report(
    path: &std::path::Path,
    evaluation: &Evaluation,
    config: &LearnConfig,
) -> Result<()> {
    let coefficients: serde_json::Map<String, serde_json::Value> = evaluation
        .columns
        .iter()
        .zip(evaluation.model.coefficients())
        .map(|(name, w)| (name.clone(), json!(w)))
        .collect();
    let report = json!({
        "config": config,
        "train_rows": evaluation.train_rows,
        "test_rows": evaluation.test_rows,
        "dropped_rows": evaluation.incomplete,
        "coefficients": coefficients,
        "intercept": evaluation.model.intercept(),
        "confusion": evaluation.confusion,
        "scores": evaluation.confusion.scores(),
    });
    let text = serde_json::to_string_pretty(&report)?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote model report to {}", path.display());
    Ok(())
}

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use gisfire_algo::{
    fill_negative, fill_other_negative, fill_positive, FeatureRequirements, FillOutcome,
    SamplingConfig,
};
use gisfire_cli::cli::{FillCommands, SamplingArgs};
use gisfire_cli::GisfireConfig;
use gisfire_core::LightningId;
use gisfire_io::{read_feature_rows, read_matched, write_feature_rows};
use tracing::info;

use super::api::client as api_client;
use super::telemetry::record_run_timed;

pub fn handle(command: &FillCommands, config: &GisfireConfig) -> Result<()> {
    match command {
        FillCommands::Positive {
            api,
            matched,
            output,
        } => {
            let input = matched.display().to_string();
            let start = Instant::now();
            let res = (|| -> Result<()> {
                let client = api_client(api, &config.api)?;
                let records = read_matched(matched)?;
                info!("Loaded {} matched strikes from {}", records.len(), input);
                let ids: Vec<LightningId> = records.iter().map(|r| r.id).collect();
                let outcome = fill_positive(&client, &ids, &FeatureRequirements::positive());
                write_outcome(output, &outcome)
            })();
            record_run_timed(output, "fill positive", &[("matched", input.as_str())], start, &res);
            res
        }
        FillCommands::Negative {
            api,
            sampling,
            positives,
            output,
        } => {
            let sampling_config = apply_sampling(&config.sampling, sampling);
            let input = positives.display().to_string();
            let seed = sampling_config.seed.to_string();
            let per_example = sampling_config.per_example.to_string();
            let start = Instant::now();
            let res = (|| -> Result<()> {
                let client = api_client(api, &config.api)?;
                let positive_rows = read_feature_rows(positives)?;
                info!("Loaded {} positive examples from {}", positive_rows.len(), input);
                let outcome = fill_negative(&client, &positive_rows, &sampling_config);
                write_outcome(output, &outcome)
            })();
            record_run_timed(
                output,
                "fill negative",
                &[
                    ("positives", input.as_str()),
                    ("seed", seed.as_str()),
                    ("per_example", per_example.as_str()),
                ],
                start,
                &res,
            );
            res
        }
        FillCommands::OtherNegative {
            api,
            sampling,
            positives,
            output,
            start: first_day,
            end: last_day,
            min_strikes_per_day,
        } => {
            let mut sampling_config = apply_sampling(&config.sampling, sampling);
            if let Some(day) = first_day {
                sampling_config.start = *day;
            }
            if let Some(day) = last_day {
                sampling_config.end = *day;
            }
            if let Some(min) = min_strikes_per_day {
                sampling_config.min_strikes_per_day = *min;
            }
            let input = positives.display().to_string();
            let seed = sampling_config.seed.to_string();
            let per_example = sampling_config.per_example.to_string();
            let range = format!("{}..{}", sampling_config.start, sampling_config.end);
            let start = Instant::now();
            let res = (|| -> Result<()> {
                let client = api_client(api, &config.api)?;
                let positive_rows = read_feature_rows(positives)?;
                info!("Loaded {} positive examples from {}", positive_rows.len(), input);
                let outcome = fill_other_negative(&client, &positive_rows, &sampling_config);
                write_outcome(output, &outcome)
            })();
            record_run_timed(
                output,
                "fill other-negative",
                &[
                    ("positives", input.as_str()),
                    ("seed", seed.as_str()),
                    ("per_example", per_example.as_str()),
                    ("days", range.as_str()),
                ],
                start,
                &res,
            );
            res
        }
    }
}

fn apply_sampling(base: &SamplingConfig, args: &SamplingArgs) -> SamplingConfig {
    let mut config = base.clone();
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(per_example) = args.per_example {
        config.per_example = per_example;
    }
    config
}

fn write_outcome(output: &Path, outcome: &FillOutcome) -> Result<()> {
    write_feature_rows(output, &outcome.rows)?;
    println!(
        "Wrote {} examples to {} ({} skipped, {} failed)",
        outcome.summary.produced,
        output.display(),
        outcome.summary.skipped,
        outcome.summary.failed
    );
    Ok(())
}

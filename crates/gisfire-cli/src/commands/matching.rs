use std::time::Instant;

use anyhow::{anyhow, Result};
use chrono::FixedOffset;
use gisfire_algo::match_reports;
use gisfire_cli::{GisfireConfig, MatchArgs};
use gisfire_io::{read_firefighter_reports, write_matched};
use tracing::info;

use super::api::client as api_client;
use super::telemetry::record_run_timed;

pub fn handle(args: &MatchArgs, config: &GisfireConfig) -> Result<()> {
    let mut section = config.matcher.clone();
    if let Some(value) = args.max_distance {
        section.max_distance = value;
    }
    if let Some(value) = args.time_divisor {
        section.time_divisor = value;
    }
    if let Some(value) = args.window_days {
        section.window_days = value;
    }
    if let Some(value) = args.utc_offset_hours {
        section.report_utc_offset_hours = value;
    }

    let max_distance = section.max_distance.to_string();
    let time_divisor = section.time_divisor.to_string();
    let window_days = section.window_days.to_string();
    let offset_hours = section.report_utc_offset_hours.to_string();
    let firefighters = args.firefighters.display().to_string();
    let params = [
        ("firefighters", firefighters.as_str()),
        ("max_distance", max_distance.as_str()),
        ("time_divisor", time_divisor.as_str()),
        ("window_days", window_days.as_str()),
        ("utc_offset_hours", offset_hours.as_str()),
    ];

    let start = Instant::now();
    let res = (|| -> Result<()> {
        let offset = section
            .report_utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| anyhow!("invalid UTC offset {}h", section.report_utc_offset_hours))?;
        let client = api_client(&args.api, &config.api)?;
        let load = read_firefighter_reports(&args.firefighters, offset)?;
        info!(
            reports = load.reports.len(),
            skipped = load.skipped,
            "loaded firefighter reports from {}",
            args.firefighters.display()
        );

        let (records, summary) = match_reports(&client, &load.reports, &section.matcher());
        write_matched(&args.output, &records)?;
        println!(
            "Matched {} of {} reports ({} without match, {} failed) -> {}",
            summary.matched,
            summary.reports,
            summary.unmatched,
            summary.failed,
            args.output.display()
        );
        Ok(())
    })();
    record_run_timed(&args.output, "match", &params, start, &res);
    res
}

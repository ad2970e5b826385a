use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gisfire_core::time::flexible_utc;
use gisfire_core::{FirefighterReport, LightningId, Match};
use serde::{Deserialize, Serialize};

/// One line of the matched-lightnings file: the strike, its distance to the
/// report and the report itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedLightningRecord {
    pub id: LightningId,
    pub meteocat_id: Option<String>,
    #[serde(rename = "date-UTC", with = "flexible_utc")]
    pub date: DateTime<Utc>,
    pub x: f64,
    pub y: f64,
    /// Spatiotemporal distance between strike and report.
    pub weight: f64,
    #[serde(rename = "date-UTC-ff", with = "flexible_utc")]
    pub report_date: DateTime<Utc>,
    #[serde(rename = "x-ff")]
    pub report_x: f64,
    #[serde(rename = "y-ff")]
    pub report_y: f64,
}

impl MatchedLightningRecord {
    pub fn new(found: &Match, report: &FirefighterReport) -> Self {
        Self {
            id: found.lightning.id,
            meteocat_id: found.lightning.meteocat_id.clone(),
            date: found.lightning.date,
            x: found.lightning.location.x,
            y: found.lightning.location.y,
            weight: found.distance,
            report_date: report.date,
            report_x: report.location.x,
            report_y: report.location.y,
        }
    }
}

pub fn write_matched(path: &Path, records: &[MatchedLightningRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating matched lightnings {}", path.display()))?;
    if records.is_empty() {
        writer.write_record([
            "id",
            "meteocat_id",
            "date-UTC",
            "x",
            "y",
            "weight",
            "date-UTC-ff",
            "x-ff",
            "y-ff",
        ])?;
    }
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("writing strike {} to {}", record.id, path.display()))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_matched(path: &Path) -> Result<Vec<MatchedLightningRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening matched lightnings {}", path.display()))?;
    let mut records = Vec::new();
    for (line, record) in reader.deserialize().enumerate() {
        let record: MatchedLightningRecord =
            record.with_context(|| format!("parsing {} row {}", path.display(), line + 2))?;
        records.push(record);
    }
    Ok(records)
}

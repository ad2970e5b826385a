//! Example feature files.
//!
//! Written by every `fill` command and read back twice: as typed
//! [`FeatureRow`]s when negatives are sampled around existing positives, and
//! as a numeric [`FeatureTable`] for learning.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use csv::StringRecord;
use gisfire_core::{
    format_utc, measure_columns, parse_utc, FeatureRow, LandCover, LightningId,
    FEATURE_BASE_COLUMNS, MEASURES_PER_EXAMPLE,
};

pub fn write_feature_rows(path: &Path, rows: &[FeatureRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating example file {}", path.display()))?;
    writer.write_record(FeatureRow::header())?;
    for row in rows {
        if !row.is_complete() {
            bail!(
                "strike {} has {} measurements, expected {}",
                row.id,
                row.measures.len(),
                MEASURES_PER_EXAMPLE
            );
        }
        writer
            .write_record(encode_row(row))
            .with_context(|| format!("writing strike {} to {}", row.id, path.display()))?;
    }
    writer.flush()?;
    Ok(())
}

fn encode_row(row: &FeatureRow) -> Vec<String> {
    let mut cells = vec![
        row.id.to_string(),
        format_utc(&row.date),
        row.peak_current.to_string(),
        row.chi_squared.to_string(),
        row.number_of_sensors.to_string(),
        if row.hit_ground { "True" } else { "False" }.to_string(),
        row.discharges.to_string(),
        row.land_cover.code().to_string(),
    ];
    cells.extend(
        row.measures
            .iter()
            .map(|m| m.map(|v| v.to_string()).unwrap_or_default()),
    );
    cells
}

/// Read an example file back into typed rows.
///
/// Measurement columns absent from the file read as missing.
pub fn read_feature_rows(path: &Path) -> Result<Vec<FeatureRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening example file {}", path.display()))?;
    let index: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, name)| (name.to_string(), i))
        .collect();
    for column in FEATURE_BASE_COLUMNS {
        if !index.contains_key(column) {
            bail!("{} has no {} column", path.display(), column);
        }
    }
    let measure_index: Vec<Option<usize>> = measure_columns()
        .iter()
        .map(|name| index.get(name).copied())
        .collect();

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let row = decode_row(&record, &index, &measure_index)
            .with_context(|| format!("parsing {} row {}", path.display(), line + 2))?;
        rows.push(row);
    }
    Ok(rows)
}

fn decode_row(
    record: &StringRecord,
    index: &HashMap<String, usize>,
    measure_index: &[Option<usize>],
) -> Result<FeatureRow> {
    let cell = |name: &str| -> Result<String> {
        record
            .get(index[name])
            .map(|raw| raw.trim().to_string())
            .ok_or_else(|| anyhow!("row is missing column {name}"))
    };
    let number = |name: &str| -> Result<f64> {
        let raw = cell(name)?;
        raw.parse::<f64>()
            .with_context(|| format!("{name} = '{raw}'"))
    };

    let measures = measure_index
        .iter()
        .map(|&i| match i.and_then(|i| record.get(i)) {
            Some(raw) => parse_optional_number(raw),
            None => Ok(None),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(FeatureRow {
        id: LightningId::new(number("ID")? as i64),
        date: parse_utc(&cell("DATE")?)?,
        peak_current: number("PEAK_CURRENT")?,
        chi_squared: number("CHI_SQUARED")?,
        number_of_sensors: number("NUMBER_OF_SENSORS")? as i32,
        hit_ground: parse_bool(&cell("HIT_GROUND")?)
            .ok_or_else(|| anyhow!("HIT_GROUND is not a boolean"))?,
        discharges: number("DISCHARGES")? as i64,
        land_cover: LandCover::new(number("LAND_COVER")? as i32),
        measures,
    })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Empty and `nan` cells are missing.
fn parse_optional_number(raw: &str) -> Result<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    let value: f64 = raw
        .parse()
        .with_context(|| format!("'{raw}' is not a number"))?;
    Ok((!value.is_nan()).then_some(value))
}

/// An example file as a numeric matrix.
///
/// Booleans become 1/0, timestamps become seconds since the epoch and missing
/// cells are `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<f64>>>,
}

impl FeatureTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn read_feature_table(path: &Path) -> Result<FeatureTable> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening example file {}", path.display()))?;
    let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != columns.len() {
            bail!(
                "{} row {} has {} cells, header has {}",
                path.display(),
                line + 2,
                record.len(),
                columns.len()
            );
        }
        let row = record
            .iter()
            .zip(&columns)
            .map(|(raw, column)| {
                parse_cell(raw).with_context(|| {
                    format!("{} row {} column {}", path.display(), line + 2, column)
                })
            })
            .collect::<Result<Vec<_>>>()?;
        rows.push(row);
    }
    Ok(FeatureTable { columns, rows })
}

fn parse_cell(raw: &str) -> Result<Option<f64>> {
    let raw = raw.trim();
    if let Some(flag) = parse_bool(raw) {
        return Ok(Some(if flag { 1.0 } else { 0.0 }));
    }
    if let Ok(value) = parse_optional_number(raw) {
        return Ok(value);
    }
    let date = parse_utc(raw)?;
    Ok(Some(date.timestamp() as f64))
}

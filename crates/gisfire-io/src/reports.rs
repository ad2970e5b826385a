use std::path::Path;

use anyhow::{Context, Result};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use csv::{ReaderBuilder, StringRecord};
use gisfire_core::{FirefighterReport, Point};
use tracing::debug;

/// Firefighter reports read from a CSV file.
#[derive(Debug, Default)]
pub struct ReportLoad {
    pub reports: Vec<FirefighterReport>,
    /// Data rows that could not be parsed.
    pub skipped: usize,
}

/// Read firefighter reports.
///
/// The file has a header row and positional columns: an unused leading
/// column, the date (`dd/mm/YYYY`), the local time (`HH:MM:SS`), then `x`
/// and `y`. Further columns are ignored. Local times are shifted to UTC with
/// `offset`. Rows that do not parse are counted in [`ReportLoad::skipped`].
pub fn read_firefighter_reports(path: &Path, offset: FixedOffset) -> Result<ReportLoad> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening firefighter reports {}", path.display()))?;

    let mut load = ReportLoad::default();
    for (line, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("reading {} row {}", path.display(), line + 2))?;
        match parse_report(&record, offset) {
            Some(report) => load.reports.push(report),
            None => {
                debug!(row = line + 2, "skipping unparseable firefighter report");
                load.skipped += 1;
            }
        }
    }
    Ok(load)
}

fn parse_report(record: &StringRecord, offset: FixedOffset) -> Option<FirefighterReport> {
    let date = NaiveDate::parse_from_str(record.get(1)?.trim(), "%d/%m/%Y").ok()?;
    let time = NaiveTime::parse_from_str(record.get(2)?.trim(), "%H:%M:%S").ok()?;
    let x: f64 = record.get(3)?.trim().parse().ok()?;
    let y: f64 = record.get(4)?.trim().parse().ok()?;
    let local = offset
        .from_local_datetime(&NaiveDateTime::new(date, time))
        .single()?;
    Some(FirefighterReport::new(
        local.with_timezone(&Utc),
        Point::new(x, y),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reports_are_shifted_to_utc() {
        let file = write_csv(
            "codi,data,hora,x,y,municipi\n\
             A1,02/07/2019,13:30:00,400000.5,4600000,Lleida\n",
        );
        let load = read_firefighter_reports(file.path(), FixedOffset::east_opt(3600).unwrap())
            .unwrap();
        assert_eq!(load.skipped, 0);
        let report = load.reports[0];
        assert_eq!(
            report.date,
            Utc.with_ymd_and_hms(2019, 7, 2, 12, 30, 0).unwrap()
        );
        assert_eq!(report.location, Point::new(400000.5, 4600000.0));
    }

    #[test]
    fn unparseable_rows_are_skipped() {
        let file = write_csv(
            "codi,data,hora,x,y\n\
             A1,2019-07-02,13:30:00,1,2\n\
             A2,02/07/2019,,1,2\n\
             A3,02/07/2019,13:30:00,n/a,2\n\
             A4,02/07/2019\n\
             A5,03/07/2019,08:00:00,10,20\n",
        );
        let load = read_firefighter_reports(file.path(), FixedOffset::east_opt(0).unwrap())
            .unwrap();
        assert_eq!(load.reports.len(), 1);
        assert_eq!(load.skipped, 4);
        assert_eq!(load.reports[0].location, Point::new(10.0, 20.0));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_firefighter_reports(
            &dir.path().join("absent.csv"),
            FixedOffset::east_opt(0).unwrap(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("absent.csv"));
    }
}

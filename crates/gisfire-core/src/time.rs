//! Timestamp formats shared by the API, the CSV files and the matcher.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::{GisfireError, GisfireResult};

/// Format used for every timestamp the workspace writes, in CSV cells and in
/// API query strings: `2019-07-02T12:00:00.000000Z`.
pub const UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

pub fn format_utc(date: &DateTime<Utc>) -> String {
    date.format(UTC_FORMAT).to_string()
}

/// Parse an ISO-8601 timestamp. Offsets are honoured; naive timestamps are
/// taken as UTC.
pub fn parse_utc(raw: &str) -> GisfireResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc());
        }
    }
    Err(GisfireError::Parse(format!("unrecognised timestamp '{raw}'")))
}

/// Serde adapter for [`DateTime<Utc>`] fields using [`parse_utc`] /
/// [`format_utc`].
pub mod flexible_utc {
    use super::{format_utc, parse_utc};
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_utc(date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_utc(&raw).map_err(D::Error::custom)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Int(i64),
    Float(f64),
}

/// Accept `"123"`, `123`, `null` or an absent field.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::Str(s) => s,
            StringOrNumber::Int(i) => i.to_string(),
            StringOrNumber::Float(f) => f.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_with_microseconds() {
        let date = Utc.with_ymd_and_hms(2019, 7, 2, 12, 0, 5).unwrap();
        assert_eq!(format_utc(&date), "2019-07-02T12:00:05.000000Z");
    }

    #[test]
    fn parses_offsets_and_naive() {
        let expected = Utc.with_ymd_and_hms(2019, 7, 2, 10, 0, 0).unwrap();
        assert_eq!(parse_utc("2019-07-02T12:00:00+02:00").unwrap(), expected);
        assert_eq!(parse_utc("2019-07-02T10:00:00.000000Z").unwrap(), expected);
        assert_eq!(parse_utc("2019-07-02T10:00:00").unwrap(), expected);
        assert_eq!(parse_utc("2019-07-02 10:00:00").unwrap(), expected);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse_utc("yesterday"), Err(GisfireError::Parse(_))));
    }

    #[test]
    fn round_trips_its_own_format() {
        let date = Utc.with_ymd_and_hms(2016, 8, 14, 23, 59, 59).unwrap();
        assert_eq!(parse_utc(&format_utc(&date)).unwrap(), date);
    }
}

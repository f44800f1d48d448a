//! Timestamp helpers for marketplace data.

use chrono::{DateTime, NaiveDateTime, Utc};
use crate::{Result, TurkError};

/// Format of timestamps returned by the marketplace API.
pub const AMAZON_ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Default format used for result timestamps.
pub const RESULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn parse(value: &str, format: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, format).map_err(|source| TurkError::Parse {
        value: value.to_string(),
        source,
    })
}

/// Parse a marketplace timestamp.
pub fn amazon_string_to_datetime(value: &str) -> Result<DateTime<Utc>> {
    Ok(parse(value, AMAZON_ISO_FORMAT)?.and_utc())
}

/// Minutes elapsed from `t1` to `t2` (negative when `t2` is earlier).
pub fn time_difference_minutes(t1: &str, t2: &str, format: Option<&str>) -> Result<f64> {
    let format = format.unwrap_or(RESULT_TIME_FORMAT);
    let d1 = parse(t1, format)?;
    let d2 = parse(t2, format)?;
    Ok((d2 - d1).num_milliseconds() as f64 / 60_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_amazon_timestamp() {
        let dt = amazon_string_to_datetime("2016-02-29T13:45:10Z").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2016, 2, 29));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (13, 45, 10));
        assert!(amazon_string_to_datetime("2016-02-29 13:45:10").is_err());
    }

    #[test]
    fn test_time_difference() {
        let minutes = time_difference_minutes("2016-03-01 10:00:00", "2016-03-01 10:45:30", None).unwrap();
        assert_eq!(minutes, 45.5);

        let back = time_difference_minutes("2016-03-01 11:00:00", "2016-03-01 10:00:00", None).unwrap();
        assert_eq!(back, -60.0);

        let custom = time_difference_minutes("01/03/2016 10:00", "01/03/2016 12:00", Some("%d/%m/%Y %H:%M")).unwrap();
        assert_eq!(custom, 120.0);
    }

    #[test]
    fn test_bad_input() {
        assert!(matches!(
            time_difference_minutes("yesterday", "2016-03-01 10:00:00", None),
            Err(TurkError::Parse { .. })
        ));
    }
}

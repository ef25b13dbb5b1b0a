use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Error, Result};

const EXPECTED: &str = "ISO-8601 date-time";

/// Parse a strict ISO-8601 date-time (`YYYY-MM-DDThh:mm:ss[.fff][Z|±hh:mm]`).
///
/// A missing offset is taken as UTC. Date-only values, reduced precision
/// (`2020-01-01T10`) and free-form dates are rejected.
pub fn parse_timestamp(input: &str) -> Result<DateTime<FixedOffset>> {
    let raw = input.trim();
    let malformed = || Error::MalformedValue {
        value: input.to_string(),
        expected: EXPECTED,
    };

    let (date_part, rest) = raw.split_once('T').ok_or_else(malformed)?;
    let date = parse_date(date_part).ok_or_else(malformed)?;
    let (time_part, offset) = split_offset(rest).ok_or_else(malformed)?;
    let time = parse_time(time_part).ok_or_else(malformed)?;

    NaiveDateTime::new(date, time)
        .and_local_timezone(offset)
        .single()
        .ok_or_else(malformed)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    // Exactly YYYY-MM-DD; chrono alone accepts unpadded fields.
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    if ![&s[0..4], &s[5..7], &s[8..10]].iter().all(|p| is_digits(p)) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Unsigned ASCII digits only; `str::parse` would also take a sign.
fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    let (main, frac) = match s.split_once('.') {
        Some((main, frac)) => (main, Some(frac)),
        None => (s, None),
    };

    let parts: Vec<&str> = main.split(':').collect();
    let [hh, mm, ss] = parts.as_slice() else {
        return None;
    };
    if [hh, mm, ss].iter().any(|p| p.len() != 2 || !is_digits(p)) {
        return None;
    }

    let hour: u32 = hh.parse().ok()?;
    let minute: u32 = mm.parse().ok()?;
    let second: u32 = ss.parse().ok()?;

    let nanos: u32 = match frac {
        Some(frac) => {
            if frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let digits: String = frac.chars().take(9).collect();
            format!("{:0<9}", digits).parse().ok()?
        }
        None => 0,
    };

    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
}

fn split_offset(rest: &str) -> Option<(&str, FixedOffset)> {
    if let Some(stripped) = rest.strip_suffix('Z') {
        return Some((stripped, FixedOffset::east_opt(0)?));
    }

    if let Some(pos) = rest.rfind(['+', '-']) {
        let (time, tz) = rest.split_at(pos);
        let bytes = tz.as_bytes();
        if bytes.len() != 6 || bytes[3] != b':' {
            return None;
        }
        if !is_digits(&tz[1..3]) || !is_digits(&tz[4..6]) {
            return None;
        }
        let sign = if tz.starts_with('-') { -1 } else { 1 };
        let hours: i32 = tz[1..3].parse().ok()?;
        let minutes: i32 = tz[4..6].parse().ok()?;
        let offset = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?;
        return Some((time, offset));
    }

    Some((rest, FixedOffset::east_opt(0)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_offsets() {
        let utc = parse_timestamp("2020-01-01T00:00:00Z").unwrap();
        assert_eq!(utc.offset().local_minus_utc(), 0);

        let cet = parse_timestamp("2020-06-15T12:30:00+02:00").unwrap();
        assert_eq!(cet.offset().local_minus_utc(), 7200);
        assert_eq!(cet.hour(), 12);

        let west = parse_timestamp("2020-06-15T12:30:00-05:30").unwrap();
        assert_eq!(west.offset().local_minus_utc(), -(5 * 3600 + 30 * 60));
    }

    #[test]
    fn test_missing_offset_is_utc() {
        let ts = parse_timestamp("2021-03-04T05:06:07").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 0);
        assert_eq!(ts.day(), 4);
    }

    #[test]
    fn test_fractional_seconds() {
        let ts = parse_timestamp("2021-03-04T05:06:07.25Z").unwrap();
        assert_eq!(ts.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_rejects_partial_values() {
        for input in [
            "2020-01-01",
            "2020-01",
            "2020-01-01T10",
            "2020-01-01T10:00",
            "2020-1-1T10:00:00Z",
            "2020-01-01T10:00:00.Z",
            "2020-01-01T10:00:00+0200",
            "2020-02-30T00:00:00Z",
            "01/02/2020",
            "",
            "2020-01-01T+1:00:00Z",
            "2020-01-01T10:+1:00Z",
            "+020-01-01T10:00:00Z",
            "2020-+1-01T10:00:00Z",
            "2020-01-01T10:00:00+-1:00",
        ] {
            assert!(parse_timestamp(input).is_err(), "{} should be rejected", input);
        }
    }
}

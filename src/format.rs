//! Leaf formatting helpers shared by the calendar, cache and content layers.

use crate::error::{Result, TrackerError};
use chrono::{DateTime, Datelike, Utc};
use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Left-pads a number below ten with a single zero.
pub fn add_zero(num: u32) -> String {
    if num < 10 {
        format!("0{}", num)
    } else {
        num.to_string()
    }
}

/// `YYYY-MM-DD` in UTC.
pub fn utc_day(date: &DateTime<Utc>) -> String {
    format!(
        "{}-{}-{}",
        date.year(),
        add_zero(date.month()),
        add_zero(date.day())
    )
}

/// Formats a UTC timestamp with a strftime pattern, rejecting unknown specifiers.
pub fn format_utc(date: &DateTime<Utc>, pattern: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(pattern))
        .map_err(|_| TrackerError::InvalidDate(format!("unsupported format pattern '{}'", pattern)))?;
    Ok(out)
}

/// Short timestamp for listings: `MM/dd` within the current year, `yy/MM/dd` otherwise.
pub fn format_human_time(date: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    if date.year() == now.year() {
        date.format("%m/%d").to_string()
    } else {
        date.format("%y/%m/%d").to_string()
    }
}

const COMPACT_UNITS: [(f64, &str); 4] = [(1e3, "K"), (1e6, "M"), (1e9, "B"), (1e12, "T")];

/// Compact English notation, e.g. `1.2K`, `12K`, `345K`, `3.4M`.
pub fn format_number(num: u64) -> String {
    if num < 1_000 {
        return num.to_string();
    }

    let value = num as f64;
    let mut unit = COMPACT_UNITS
        .iter()
        .rposition(|(scale, _)| value >= *scale)
        .unwrap_or(0);
    let mut scaled = round_compact(value / COMPACT_UNITS[unit].0);
    // 999_999 rounds up to 1000K, which reads as 1M
    if scaled >= 1_000.0 && unit + 1 < COMPACT_UNITS.len() {
        unit += 1;
        scaled = round_compact(value / COMPACT_UNITS[unit].0);
    }

    let suffix = COMPACT_UNITS[unit].1;
    if scaled.fract() == 0.0 {
        format!("{}{}", scaled as u64, suffix)
    } else {
        format!("{:.1}{}", scaled, suffix)
    }
}

fn round_compact(scaled: f64) -> f64 {
    if scaled < 10.0 {
        (scaled * 10.0).round() / 10.0
    } else {
        scaled.round()
    }
}

/// Hex-encoded SHA-256 digest of a UTF-8 message.
pub fn sha256_hex(message: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(message.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_add_zero() {
        assert_eq!(add_zero(0), "00");
        assert_eq!(add_zero(7), "07");
        assert_eq!(add_zero(10), "10");
        assert_eq!(add_zero(123), "123");
    }

    #[test]
    fn test_utc_day() {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 23, 59, 59).unwrap();
        assert_eq!(utc_day(&date), "2024-03-05");
    }

    #[test]
    fn test_format_utc() {
        let date = Utc.with_ymd_and_hms(2022, 11, 9, 8, 4, 0).unwrap();
        assert_eq!(format_utc(&date, "%Y/%m/%d %H:%M").unwrap(), "2022/11/09 08:04");
        assert!(format_utc(&date, "%Q").is_err());
    }

    #[test]
    fn test_format_human_time() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let this_year = Utc.with_ymd_and_hms(2024, 2, 9, 12, 0, 0).unwrap();
        let last_year = Utc.with_ymd_and_hms(2023, 12, 31, 12, 0, 0).unwrap();
        assert_eq!(format_human_time(&this_year, &now), "02/09");
        assert_eq!(format_human_time(&last_year, &now), "23/12/31");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1K");
        assert_eq!(format_number(1_234), "1.2K");
        assert_eq!(format_number(9_960), "10K");
        assert_eq!(format_number(12_345), "12K");
        assert_eq!(format_number(345_678), "346K");
        assert_eq!(format_number(999_999), "1M");
        assert_eq!(format_number(3_400_000), "3.4M");
        assert_eq!(format_number(1_000_000_000), "1B");
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}

//! Day and ISO week identifiers used to group tracked changes chronologically.
//!
//! A day is encoded as `YYYYMMDD` and a week as `YYYYWW`. Week numbers follow
//! the Thursday-anchored ISO 8601 rule: a week belongs to the year that owns
//! its Thursday, so the first days of January can belong to the last week of
//! the previous year and the last days of December to week 1 of the next.
//!
//! Everything here is a pure function of its input. Years before 1 CE are
//! outside the supported domain.

use crate::error::{Result, TrackerError};
use crate::format::add_zero;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const DAYS_PER_WEEK: i64 = 7;

/// `YYYYMMDD`, e.g. `20240115`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayNumber(pub u32);

/// `YYYYWW` where `WW` is the ISO week of the owning year, e.g. `202401`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekNumber(pub u32);

impl fmt::Display for DayNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for WeekNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl DayNumber {
    pub fn from_date(date: NaiveDate) -> Self {
        DayNumber(date.year() as u32 * 10_000 + date.month() * 100 + date.day())
    }

    pub fn year(self) -> i32 {
        (self.0 / 10_000) as i32
    }

    pub fn month(self) -> u32 {
        (self.0 / 100) % 100
    }

    pub fn day(self) -> u32 {
        self.0 % 100
    }
}

impl WeekNumber {
    /// The ISO week containing `date`, computed by shifting to that week's Thursday.
    pub fn from_date(date: NaiveDate) -> Self {
        // Monday = 1 .. Sunday = 7
        let iso_weekday = date.weekday().number_from_monday() as i64;
        let thursday = date + Duration::days(4 - iso_weekday);
        let owning_year = thursday.year();
        // whole weeks from January 1st of the owning year, rounded up
        let days_since_jan1 = thursday.ordinal0() as i64 + 1;
        let week = (days_since_jan1 + DAYS_PER_WEEK - 1) / DAYS_PER_WEEK;
        WeekNumber(owning_year as u32 * 100 + week as u32)
    }

    pub fn year(self) -> i32 {
        (self.0 / 100) as i32
    }

    pub fn week(self) -> u32 {
        self.0 % 100
    }
}

/// Read-only view of a [`DayNumber`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayInfo {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub number: DayNumber,
    /// `YYYY-MM-DD`
    pub id: String,
    /// `Jan 15, 2024`
    pub name: String,
    /// `YYYY/MM/DD`
    pub path: String,
    pub date: NaiveDate,
}

/// Read-only view of a [`WeekNumber`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekOfYear {
    pub year: i32,
    pub week: u32,
    pub number: WeekNumber,
    /// `YYYY-W`
    pub id: String,
    /// `Mon DD - Mon DD, YYYY`
    pub name: String,
    /// `YYYY/W`
    pub path: String,
    /// Monday that opens the week.
    pub date: NaiveDate,
}

/// Floors `date` to its UTC calendar day and encodes it as `YYYYMMDD`.
pub fn day_number(date: &DateTime<Utc>) -> DayNumber {
    DayNumber::from_date(date.date_naive())
}

/// ISO week number of the UTC calendar day of `date`.
pub fn week_number(date: &DateTime<Utc>) -> WeekNumber {
    WeekNumber::from_date(date.date_naive())
}

pub fn parse_day_number(day: DayNumber) -> Result<DayInfo> {
    let (year, month, day_of_month) = (day.year(), day.month(), day.day());
    let date = NaiveDate::from_ymd_opt(year, month, day_of_month)
        .ok_or_else(|| TrackerError::InvalidDate(format!("day number {} is not a calendar date", day)))?;

    Ok(DayInfo {
        year,
        month,
        day: day_of_month,
        number: day,
        id: format!("{}-{}-{}", year, add_zero(month), add_zero(day_of_month)),
        name: date.format("%b %d, %Y").to_string(),
        path: format!("{}/{}/{}", year, add_zero(month), add_zero(day_of_month)),
        date,
    })
}

pub fn parse_week_number(week: WeekNumber) -> Result<WeekOfYear> {
    let monday = week_monday(week)?;
    Ok(WeekOfYear {
        year: week.year(),
        week: week.week(),
        number: week,
        id: format!("{}-{}", week.year(), week.week()),
        name: range_label(monday),
        path: format!("{}/{}", week.year(), week.week()),
        date: monday,
    })
}

/// `"Jan 01 - Jan 07, 2024"`; the year shown is the calendar year of the Monday.
pub fn week_range_label(week: WeekNumber) -> Result<String> {
    week_monday(week).map(range_label)
}

/// Monday 00:00 UTC of the week containing `date`.
pub fn start_of_week(date: &DateTime<Utc>) -> DateTime<Utc> {
    let day = date.date_naive();
    let monday = day - Duration::days(day.weekday().num_days_from_monday() as i64);
    Utc.from_utc_datetime(&monday.and_time(NaiveTime::MIN))
}

/// The Monday that begins `week`, rejecting weeks the owning year does not have.
pub fn week_monday(week: WeekNumber) -> Result<NaiveDate> {
    let (year, week_of_year) = (week.year(), week.week());
    if !(1..=53).contains(&week_of_year) {
        return Err(TrackerError::InvalidDate(format!(
            "week number {} has week {} outside 1..=53",
            week, week_of_year
        )));
    }

    let monday = first_week_monday(year)
        .and_then(|first| first.checked_add_signed(Duration::days((week_of_year as i64 - 1) * DAYS_PER_WEEK)))
        .ok_or_else(|| TrackerError::InvalidDate(format!("week number {} is out of range", week)))?;

    // week 53 only exists in years whose last Thursday falls in that week
    if WeekNumber::from_date(monday) != week {
        return Err(TrackerError::InvalidDate(format!(
            "year {} has no week {}",
            year, week_of_year
        )));
    }
    Ok(monday)
}

fn first_week_monday(year: i32) -> Option<NaiveDate> {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let weekday = jan1.weekday();
    let monday_on_or_before = jan1.checked_sub_signed(Duration::days(weekday.num_days_from_monday() as i64))?;
    // Jan 1st on Fri/Sat/Sun belongs to the previous year's last week
    if weekday.number_from_monday() > 4 {
        monday_on_or_before.checked_add_signed(Duration::days(DAYS_PER_WEEK))
    } else {
        Some(monday_on_or_before)
    }
}

fn range_label(monday: NaiveDate) -> String {
    let sunday = monday + Duration::days(DAYS_PER_WEEK - 1);
    format!(
        "{} - {}, {}",
        monday.format("%b %d"),
        sunday.format("%b %d"),
        monday.year()
    )
}

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};
use track_awesome::calendar::{
    day_number, parse_day_number, parse_week_number, start_of_week, week_number, week_range_label, DayNumber,
    WeekNumber,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn every_day(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |d| *d <= to)
}

#[test]
fn test_day_number_floors_to_utc_date() {
    let late = Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 59).unwrap();
    assert_eq!(day_number(&late), DayNumber(20240115));
    let early = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
    assert_eq!(day_number(&early), DayNumber(20240115));
}

#[test]
fn test_parse_day_number_fields() {
    let info = parse_day_number(DayNumber(20240115)).unwrap();
    assert_eq!(info.year, 2024);
    assert_eq!(info.month, 1);
    assert_eq!(info.day, 15);
    assert_eq!(info.id, "2024-01-15");
    assert_eq!(info.name, "Jan 15, 2024");
    assert_eq!(info.path, "2024/01/15");
    assert_eq!(info.date, ymd(2024, 1, 15));
}

#[test]
fn test_day_number_round_trip() {
    for date in every_day(ymd(1970, 1, 1), ymd(2100, 12, 31)) {
        let instant = Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap());
        let info = parse_day_number(day_number(&instant)).unwrap();
        assert_eq!(info.date, date);
    }
}

#[test]
fn test_parse_day_number_rejects_invalid_dates() {
    for invalid in [20230229, 20241301, 20240100, 20240431, 0] {
        assert!(
            parse_day_number(DayNumber(invalid)).is_err(),
            "{} should be rejected",
            invalid
        );
    }
    assert!(parse_day_number(DayNumber(20240229)).is_ok());
}

#[test]
fn test_week_number_known_values() {
    let at = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 8, 0, 0).unwrap();
    // Jan 1st 2024 is a Monday
    assert_eq!(week_number(&at(2024, 1, 1)), WeekNumber(202401));
    // Jan 1st 2023 is a Sunday and closes the last week of 2022
    assert_eq!(week_number(&at(2023, 1, 1)), WeekNumber(202252));
    assert_eq!(week_number(&at(2019, 12, 30)), WeekNumber(202001));
    assert_eq!(week_number(&at(2024, 12, 30)), WeekNumber(202501));
    assert_eq!(week_number(&at(2026, 12, 31)), WeekNumber(202653));
}

#[test]
fn test_week_number_for_each_jan1_weekday() {
    // (year, weekday of Jan 1st, expected week of Jan 1st)
    let cases = [
        (2024, chrono::Weekday::Mon, 202401),
        (2019, chrono::Weekday::Tue, 201901),
        (2020, chrono::Weekday::Wed, 202001),
        (2015, chrono::Weekday::Thu, 201501),
        (2021, chrono::Weekday::Fri, 202053),
        (2022, chrono::Weekday::Sat, 202152),
        (2023, chrono::Weekday::Sun, 202252),
    ];
    for (year, weekday, expected) in cases {
        let jan1 = ymd(year, 1, 1);
        assert_eq!(jan1.weekday(), weekday);
        assert_eq!(WeekNumber::from_date(jan1), WeekNumber(expected), "Jan 1st {}", year);

        // the week must also map back to a Monday on or before Jan 4th
        let info = parse_week_number(WeekNumber::from_date(ymd(year, 1, 4))).unwrap();
        assert_eq!(info.week, 1);
        assert_eq!(info.date.weekday(), chrono::Weekday::Mon);
        assert!(info.date <= ymd(year, 1, 4) && info.date > ymd(year, 1, 4) - Duration::days(7));
    }
}

#[test]
fn test_week_number_matches_iso_week() {
    for date in every_day(ymd(1990, 1, 1), ymd(2100, 12, 31)) {
        let iso = date.iso_week();
        let expected = WeekNumber(iso.year() as u32 * 100 + iso.week());
        assert_eq!(WeekNumber::from_date(date), expected, "{}", date);
    }
}

#[test]
fn test_week_number_changes_only_on_monday() {
    for date in every_day(ymd(2010, 1, 1), ymd(2030, 12, 31)) {
        let next = date + Duration::days(1);
        let changed = WeekNumber::from_date(date) != WeekNumber::from_date(next);
        assert_eq!(changed, next.weekday() == chrono::Weekday::Mon, "{} -> {}", date, next);
    }
}

#[test]
fn test_parse_week_number_returns_start_of_week() {
    for date in every_day(ymd(2000, 1, 1), ymd(2040, 12, 31)) {
        let instant = Utc.from_utc_datetime(&date.and_hms_opt(18, 30, 0).unwrap());
        let info = parse_week_number(week_number(&instant)).unwrap();
        assert_eq!(info.date, start_of_week(&instant).date_naive(), "{}", date);
        assert_eq!(WeekNumber::from_date(info.date), info.number);
    }
}

#[test]
fn test_parse_week_number_fields() {
    let info = parse_week_number(WeekNumber(202401)).unwrap();
    assert_eq!(info.year, 2024);
    assert_eq!(info.week, 1);
    assert_eq!(info.id, "2024-1");
    assert_eq!(info.path, "2024/1");
    assert_eq!(info.name, "Jan 01 - Jan 07, 2024");
    assert_eq!(info.date, ymd(2024, 1, 1));
}

#[test]
fn test_parse_week_number_rejects_missing_weeks() {
    // 2021 has 52 weeks, 2020 and 2026 have 53
    assert!(parse_week_number(WeekNumber(202153)).is_err());
    assert!(parse_week_number(WeekNumber(202053)).is_ok());
    assert!(parse_week_number(WeekNumber(202653)).is_ok());
    assert!(parse_week_number(WeekNumber(202400)).is_err());
    assert!(parse_week_number(WeekNumber(202454)).is_err());
}

#[test]
fn test_week_range_label_across_year_boundary() {
    assert_eq!(week_range_label(WeekNumber(202053)).unwrap(), "Dec 28 - Jan 03, 2020");
    assert_eq!(week_range_label(WeekNumber(202501)).unwrap(), "Dec 30 - Jan 05, 2024");
    assert_eq!(week_range_label(WeekNumber(202252)).unwrap(), "Dec 26 - Jan 01, 2022");
}

#[test]
fn test_start_of_week_is_monday_midnight() {
    let sunday = Utc.with_ymd_and_hms(2023, 1, 1, 22, 15, 0).unwrap();
    assert_eq!(
        start_of_week(&sunday),
        Utc.with_ymd_and_hms(2022, 12, 26, 0, 0, 0).unwrap()
    );
    let monday = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(start_of_week(&monday), monday);
}

use chrono::NaiveDate;
use postbox_core::{
    format_date, parse_bound, parse_entry_date, BoundSide, DateRange, FilterError, Lang, RawEntry,
};
use pretty_assertions::assert_eq;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn rows(dates: &[&str]) -> Vec<RawEntry> {
    dates
        .iter()
        .map(|date| RawEntry {
            subject: format!("Dokument {date}"),
            date_text: date.to_string(),
            ..RawEntry::default()
        })
        .collect()
}

fn kept_dates(kept: &[RawEntry]) -> Vec<&str> {
    kept.iter().map(|row| row.date_text.as_str()).collect()
}

#[test]
fn entry_dates_must_be_real_calendar_days() {
    assert_eq!(parse_entry_date("29.02.2024"), Some(day(2024, 2, 29)));
    assert_eq!(parse_entry_date("31.02.2023"), None);
    assert_eq!(parse_entry_date("1.2.2023"), None);
    assert_eq!(parse_entry_date("2023-01-15"), None);
}

#[test]
fn date_format_tokens_are_substituted() {
    let date = day(2023, 1, 5);
    assert_eq!(format_date(date, "YYYYMMDD"), "20230105");
    assert_eq!(format_date(date, "DD.MM.YY"), "05.01.23");
    assert_eq!(format_date(date, "Q-YYYY"), "Q-2023");
}

#[test]
fn sentinels_resolve_in_both_languages() {
    let today = day(2024, 6, 1);
    for raw in ["", "start", "Anfang", "  START "] {
        let bound = parse_bound(raw, BoundSide::From, Lang::De, today).unwrap();
        assert_eq!(bound.date, None);
        assert_eq!(bound.label, "Anfang");
    }
    for raw in ["today", "Heute"] {
        let bound = parse_bound(raw, BoundSide::To, Lang::En, today).unwrap();
        assert_eq!(bound.date, Some(today));
        assert_eq!(bound.label, "Today");
    }
}

#[test]
fn invalid_input_names_the_field_and_raw_value() {
    let today = day(2024, 6, 1);
    let err = DateRange::parse("start", "32.13.2024", Lang::En, today).unwrap_err();
    assert_eq!(
        err,
        FilterError::InvalidDate {
            label: "To (date)".to_string(),
            value: "32.13.2024".to_string(),
        }
    );

    let err = DateRange::parse("gestern", "heute", Lang::De, today).unwrap_err();
    assert_eq!(
        err,
        FilterError::InvalidDate {
            label: "Von (Datum)".to_string(),
            value: "gestern".to_string(),
        }
    );
}

#[test]
fn swapped_bounds_are_a_range_error() {
    let today = day(2024, 6, 1);
    let err = DateRange::parse("01.03.2024", "01.02.2024", Lang::En, today).unwrap_err();
    assert_eq!(
        err,
        FilterError::InvalidRange {
            from: "01.03.2024".to_string(),
            to: "01.02.2024".to_string(),
        }
    );
}

#[test]
fn bounds_are_inclusive_and_outside_dates_dropped() {
    let today = day(2024, 6, 1);
    let range = DateRange::parse("01.02.2024", "29.02.2024", Lang::En, today).unwrap();
    let kept = range.retain(rows(&[
        "31.01.2024",
        "01.02.2024",
        "15.02.2024",
        "29.02.2024",
        "01.03.2024",
        "kein Datum",
    ]));
    assert_eq!(kept_dates(&kept), vec!["01.02.2024", "15.02.2024", "29.02.2024"]);
}

#[test]
fn start_to_today_keeps_everything_up_to_today() {
    let today = day(2024, 6, 1);
    let range = DateRange::parse("start", "today", Lang::En, today).unwrap();
    let kept = range.retain(rows(&["01.01.1999", "01.06.2024", "02.06.2024"]));
    assert_eq!(kept_dates(&kept), vec!["01.01.1999", "01.06.2024"]);
}

#[test]
fn equal_bounds_select_a_single_day() {
    let today = day(2024, 6, 1);
    let range = DateRange::parse("10.05.2024", "10.05.2024", Lang::De, today).unwrap();
    assert!(range.contains(day(2024, 5, 10)));
    assert!(!range.contains(day(2024, 5, 9)));
    assert!(!range.contains(day(2024, 5, 11)));
}

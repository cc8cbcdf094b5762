use time::macros::{datetime, offset};
use utilkit_core::date::{
    add_days, day_of_week, first_day_of_month, format_date, is_leap_year, last_day_of_month,
    list_days, parse_date, quarter, DEFAULT_DATE_FORMAT,
};
use utilkit_core::ErrorCategory;

#[test]
fn add_days_crosses_month_and_year_boundaries() {
    let t = datetime!(2023-12-30 10:00 UTC);
    assert_eq!(add_days(t, 3).unwrap(), datetime!(2024-01-02 10:00 UTC));
    assert_eq!(add_days(t, -30).unwrap(), datetime!(2023-11-30 10:00 UTC));

    let err = add_days(t, i64::MAX / 86_400).unwrap_err();
    assert_eq!(err.category(), Some(ErrorCategory::Validation));
}

#[test]
fn weekday_names_are_english() {
    assert_eq!(day_of_week(datetime!(2024-02-29 0:00 UTC)), "Thursday");
    assert_eq!(day_of_week(datetime!(2023-01-01 0:00 UTC)), "Sunday");
}

#[test]
fn format_and_parse_calendar_dates() {
    let t = datetime!(2024-07-04 15:30 UTC);
    assert_eq!(format_date(t, DEFAULT_DATE_FORMAT).unwrap(), "2024-07-04");
    assert_eq!(
        format_date(t, "[day]/[month]/[year] [hour]:[minute]").unwrap(),
        "04/07/2024 15:30"
    );

    assert_eq!(
        parse_date("2024-07-04", DEFAULT_DATE_FORMAT).unwrap(),
        datetime!(2024-07-04 0:00 UTC)
    );
    assert_eq!(
        parse_date("2024-07-04 08:15", "[year]-[month]-[day] [hour]:[minute]").unwrap(),
        datetime!(2024-07-04 8:15 UTC)
    );
    let with_offset = parse_date(
        "2024-07-04 08:15 +02:00",
        "[year]-[month]-[day] [hour]:[minute] [offset_hour sign:mandatory]:[offset_minute]",
    )
    .unwrap();
    assert_eq!(with_offset, datetime!(2024-07-04 6:15 UTC));
    assert_eq!(with_offset.offset(), offset!(+2));
}

#[test]
fn bad_dates_and_formats_are_validation_errors() {
    let err = parse_date("2024-13-01", DEFAULT_DATE_FORMAT).unwrap_err();
    assert_eq!(err.category(), Some(ErrorCategory::Validation));
    let err = parse_date("yesterday", DEFAULT_DATE_FORMAT).unwrap_err();
    assert_eq!(err.category(), Some(ErrorCategory::Validation));
    let err = format_date(datetime!(2024-01-01 0:00 UTC), "[nonsense]").unwrap_err();
    assert_eq!(err.category(), Some(ErrorCategory::Validation));
}

#[test]
fn quarters() {
    assert_eq!(quarter(datetime!(2024-02-10 0:00 UTC)), 1);
    assert_eq!(quarter(datetime!(2024-06-30 0:00 UTC)), 2);
    assert_eq!(quarter(datetime!(2024-09-01 0:00 UTC)), 3);
    assert_eq!(quarter(datetime!(2024-11-15 0:00 UTC)), 4);
}

#[test]
fn list_days_is_inclusive() {
    let days = list_days(datetime!(2024-02-27 0:00 UTC), datetime!(2024-03-01 0:00 UTC));
    assert_eq!(
        days,
        vec![
            datetime!(2024-02-27 0:00 UTC),
            datetime!(2024-02-28 0:00 UTC),
            datetime!(2024-02-29 0:00 UTC),
            datetime!(2024-03-01 0:00 UTC),
        ]
    );
    let same = datetime!(2024-05-05 0:00 UTC);
    assert_eq!(list_days(same, same), vec![same]);
    assert!(list_days(datetime!(2024-05-06 0:00 UTC), same).is_empty());
}

#[test]
fn month_bounds_keep_the_offset() {
    let t = datetime!(2024-02-14 18:45 +05:30);
    assert_eq!(first_day_of_month(t), datetime!(2024-02-01 0:00 +05:30));
    assert_eq!(last_day_of_month(t), datetime!(2024-02-29 0:00 +05:30));
    assert_eq!(
        last_day_of_month(datetime!(2023-02-14 0:00 UTC)),
        datetime!(2023-02-28 0:00 UTC)
    );
    assert_eq!(
        last_day_of_month(datetime!(2023-12-01 9:00 UTC)),
        datetime!(2023-12-31 0:00 UTC)
    );
}

#[test]
fn leap_years() {
    assert!(is_leap_year(2024));
    assert!(is_leap_year(2000));
    assert!(!is_leap_year(1900));
    assert!(!is_leap_year(2023));
}

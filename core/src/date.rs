use crate::error::CoreResult;
use crate::tagged::{ErrorCategory, ResultExt, TaggedError};
use time::format_description::{self, OwnedFormatItem};
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time};

/// ISO 8601 calendar date, e.g. `2024-02-29`.
pub const DEFAULT_DATE_FORMAT: &str = "[year]-[month]-[day]";

pub fn add_days(t: OffsetDateTime, days: i64) -> CoreResult<OffsetDateTime> {
    t.checked_add(Duration::days(days)).ok_or_else(|| {
        TaggedError::validation(format!("adding {} days to {} overflows", days, t)).into()
    })
}

/// English weekday name, e.g. `Monday`.
pub fn day_of_week(t: OffsetDateTime) -> String {
    t.weekday().to_string()
}

pub fn format_date(t: OffsetDateTime, fmt: &str) -> CoreResult<String> {
    let items = parse_format(fmt)?;
    Ok(t
        .format(&items)
        .tag(ErrorCategory::Validation, format!("cannot format date with {:?}", fmt))?)
}

/// Parse `s` with a `time` format description.
///
/// Tried in order: a full date-time with offset, a date-time assumed to be
/// UTC, and a bare date at UTC midnight.
pub fn parse_date(s: &str, fmt: &str) -> CoreResult<OffsetDateTime> {
    let items = parse_format(fmt)?;
    if let Ok(t) = OffsetDateTime::parse(s, &items) {
        return Ok(t);
    }
    if let Ok(t) = PrimitiveDateTime::parse(s, &items) {
        return Ok(t.assume_utc());
    }
    let date = Date::parse(s, &items).tag(
        ErrorCategory::Validation,
        format!("{:?} does not match {:?}", s, fmt),
    )?;
    Ok(date.midnight().assume_utc())
}

/// Calendar quarter, 1-4.
pub fn quarter(t: OffsetDateTime) -> u8 {
    (u8::from(t.month()) - 1) / 3 + 1
}

/// Every day from `start` to `end` inclusive, keeping the time of day of
/// `start`. Empty when `start` is after `end`.
pub fn list_days(start: OffsetDateTime, end: OffsetDateTime) -> Vec<OffsetDateTime> {
    let mut days = Vec::new();
    let mut cur = start;
    while cur <= end {
        days.push(cur);
        match cur.checked_add(Duration::DAY) {
            Some(next) => cur = next,
            None => break,
        }
    }
    days
}

/// Midnight on the first day of the month, in the same offset.
pub fn first_day_of_month(t: OffsetDateTime) -> OffsetDateTime {
    t.replace_day(1)
        .unwrap_or(t)
        .replace_time(Time::MIDNIGHT)
}

/// Midnight on the last day of the month, in the same offset.
pub fn last_day_of_month(t: OffsetDateTime) -> OffsetDateTime {
    let last = time::util::days_in_year_month(t.year(), t.month());
    t.replace_day(last)
        .unwrap_or(t)
        .replace_time(Time::MIDNIGHT)
}

pub fn is_leap_year(year: i32) -> bool {
    time::util::is_leap_year(year)
}

fn parse_format(fmt: &str) -> CoreResult<OwnedFormatItem> {
    Ok(format_description::parse_owned::<2>(fmt)
        .tag(ErrorCategory::Validation, format!("invalid date format {:?}", fmt))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn quarter_boundaries() {
        assert_eq!(quarter(datetime!(2024-01-01 0:00 UTC)), 1);
        assert_eq!(quarter(datetime!(2024-03-31 0:00 UTC)), 1);
        assert_eq!(quarter(datetime!(2024-04-01 0:00 UTC)), 2);
        assert_eq!(quarter(datetime!(2024-12-31 0:00 UTC)), 4);
    }
}

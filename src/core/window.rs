use crate::domain::model::DateWindow;
use crate::utils::error::{Result, WtError};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// 單次查詢最多 28 天，保守取 27 天
pub const WINDOW_DAYS: i64 = 27;

/// `createTimeStart` / `createTimeEnd` 的格式
pub const WIRE_TIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

pub fn format_wire_time(time: &NaiveDateTime) -> String {
    time.format(WIRE_TIME_FORMAT).to_string()
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn end_of_day(date: NaiveDate) -> Result<NaiveDateTime> {
    date.and_hms_opt(23, 59, 59)
        .ok_or_else(|| WtError::InvalidConfigValueError {
            field: "to".to_string(),
            value: date.to_string(),
            reason: "Date cannot be represented".to_string(),
        })
}

/// Jan 1 00:00:00 through Dec 31 23:59:59 of `year`.
pub fn year_bounds(year: i32) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let invalid = || WtError::InvalidConfigValueError {
        field: "year".to_string(),
        value: year.to_string(),
        reason: "Year cannot be represented".to_string(),
    };
    let first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
    let last = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;
    Ok((start_of_day(first), end_of_day(last)?))
}

/// `from` 00:00:00 through `to` 23:59:59, both days inclusive.
pub fn date_range_bounds(from: NaiveDate, to: NaiveDate) -> Result<(NaiveDateTime, NaiveDateTime)> {
    if from > to {
        return Err(WtError::ConfigValidationError {
            field: "from".to_string(),
            message: format!("start date {} is after end date {}", from, to),
        });
    }
    Ok((start_of_day(from), end_of_day(to)?))
}

/// Splits `[start, end]` into consecutive windows of at most `WINDOW_DAYS`.
/// Adjacent windows share their boundary instant.
pub fn split_windows(start: NaiveDateTime, end: NaiveDateTime) -> Vec<DateWindow> {
    let step = Duration::days(WINDOW_DAYS);
    let mut windows = Vec::new();
    let mut current = start;

    while current < end {
        let next = current.checked_add_signed(step);
        windows.push(DateWindow {
            start: current,
            end: next.map_or(end, |next| next.min(end)),
        });
        match next {
            Some(next) => current = next,
            None => break,
        }
    }

    windows
}

//! Calendar helpers for quarterly statistics.

use chrono::NaiveDate;

use crate::model::Value;

/// Returns the last day of `quarter` (1-4) in `year`, or `None` for any
/// other quarter number.
pub fn last_day_of_quarter(year: i32, quarter: u32) -> Option<NaiveDate> {
    let (month, day) = match quarter {
        1 => (3, 31),
        2 => (6, 30),
        3 => (9, 30),
        4 => (12, 31),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `last_day_of_quarter` as a midnight timestamp, ready for a datetime column.
pub fn quarter_end_value(year: i32, quarter: u32) -> Value {
    last_day_of_quarter(year, quarter)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(Value::DateTime)
        .unwrap_or(Value::Null)
}

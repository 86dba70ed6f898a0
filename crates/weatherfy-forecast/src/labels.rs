//! Human-readable timestamp labels for day and hour cards.

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

/// "Today", "Tomorrow", or a short date such as "Fri, 15 Mar".
pub fn daily_label(timestamp: NaiveDateTime, today: NaiveDate) -> String {
    let date = timestamp.date();
    if date == today {
        "Today".to_string()
    } else if date == today + Duration::days(1) {
        "Tomorrow".to_string()
    } else {
        date.format("%a, %-d %b").to_string()
    }
}

/// 12-hour clock label with hours 0-11, e.g. "0:00 AM" or "3:00 PM".
pub fn hourly_label(timestamp: NaiveDateTime) -> String {
    let hour = timestamp.hour();
    let period = if hour < 12 { "AM" } else { "PM" };
    format!("{}:{:02} {}", hour % 12, timestamp.minute(), period)
}

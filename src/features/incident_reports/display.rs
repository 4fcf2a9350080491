//! pt-BR presentation of stored reports.

use chrono::{DateTime, Datelike, FixedOffset, Offset, Timelike, Utc};

use crate::shared::constants::{
    ANONYMOUS_REPORTER, CONTACT_NOT_INFORMED, DATE_NOT_AVAILABLE, LOCATION_NOT_INFORMED,
};

fn month_to_portuguese(month: u32) -> &'static str {
    match month {
        1 => "janeiro",
        2 => "fevereiro",
        3 => "março",
        4 => "abril",
        5 => "maio",
        6 => "junho",
        7 => "julho",
        8 => "agosto",
        9 => "setembro",
        10 => "outubro",
        11 => "novembro",
        _ => "dezembro",
    }
}

/// Offset from whole hours east of UTC, falling back to UTC when out of range
pub fn offset_from_hours(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix())
}

/// "17 de outubro de 2026 às 14:30", or a placeholder while the store has
/// not stamped the report yet.
pub fn format_report_date(date: Option<DateTime<Utc>>, offset: &FixedOffset) -> String {
    let Some(date) = date else {
        return DATE_NOT_AVAILABLE.to_string();
    };
    let local = date.with_timezone(offset);
    format!(
        "{} de {} de {} às {:02}:{:02}",
        local.day(),
        month_to_portuguese(local.month()),
        local.year(),
        local.hour(),
        local.minute()
    )
}

pub fn location_or_fallback(location: &str) -> &str {
    non_blank_or(location, LOCATION_NOT_INFORMED)
}

pub fn reporter_or_fallback(name: &str) -> &str {
    non_blank_or(name, ANONYMOUS_REPORTER)
}

pub fn contact_or_fallback(contact: &str) -> &str {
    non_blank_or(contact, CONTACT_NOT_INFORMED)
}

fn non_blank_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

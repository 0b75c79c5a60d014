//! India-locale formatting helpers shared by the export engine and its hosts.
//!
//! All functions are pure: no global locale state is consulted.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone};
use std::fmt::Display;

/// Rupee sign used by [`format_currency`].
pub const CURRENCY_SYMBOL: &str = "₹";

const LONG_DATE: &str = "%-d %B %Y";
const SHORT_DATE: &str = "%d/%m/%Y";
const TIMESTAMP: &str = "%-d %B %Y, %-I:%M %p";

/// Largest magnitude whose paise count fits in a `u128`.
const MAX_GROUPED_AMOUNT: f64 = 1e36;

/// Format an amount as Indian rupees with lakh/crore digit grouping and
/// exactly two fractional digits, e.g. `1234.5` -> `₹1,234.50`.
///
/// NaN, infinities and amounts too large to count in paise are returned
/// as plain numbers without the rupee sign.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() || amount.abs() >= MAX_GROUPED_AMOUNT {
        return amount.to_string();
    }
    let paise = (amount.abs() * 100.0).round() as u128;
    let whole = group_indian(&(paise / 100).to_string());
    let sign = if amount < 0.0 && paise != 0 { "-" } else { "" };
    format!("{sign}{CURRENCY_SYMBOL}{whole}.{:02}", paise % 100)
}

/// Insert separators the Indian way: the last three digits form one group,
/// everything before it is grouped in pairs (`12,34,567`).
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}

/// Parse a date from `YYYY-MM-DD`, an RFC 3339 timestamp, or `DD/MM/YYYY`.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.date_naive());
    }
    NaiveDate::parse_from_str(trimmed, SHORT_DATE)
        .with_context(|| format!("Unrecognized date: {input:?}"))
}

/// `2024-03-05` -> `5 March 2024`.
pub fn format_date(input: &str) -> Result<String> {
    Ok(format_date_long(parse_date(input)?))
}

pub fn format_date_long(date: NaiveDate) -> String {
    date.format(LONG_DATE).to_string()
}

pub fn format_date_short(date: NaiveDate) -> String {
    date.format(SHORT_DATE).to_string()
}

/// Wall-clock timestamp as printed in document headers,
/// e.g. `5 March 2024, 2:30 PM`.
pub fn format_timestamp<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.format(TIMESTAMP).to_string()
}

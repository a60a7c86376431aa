//! `datetime:converter`: timestamps and date strings in common formats

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::types::{ToolOptions, ToolResult};
use super::error::HandlerResult;
use super::support::format_number;

/// Display formats offered by the sidebar, in metadata order
pub const FORMATS: &[&str] = &[
    "DD/MM/YYYY",
    "ISO 8601",
    "MM/DD/YYYY",
    "RFC 1123",
    "RFC 2822",
    "Unix (ms)",
    "Unix (sec)",
    "YYYY-MM-DD",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Numeric input: more than 10 digits is milliseconds, otherwise seconds
fn from_timestamp(text: &str) -> Option<Option<DateTime<Utc>>> {
    let value: f64 = text.parse().ok()?;
    if !value.is_finite() || format_number(value) != text {
        return None;
    }
    let millis = if text.len() > 10 { value } else { value * 1000.0 };
    Some(DateTime::<Utc>::from_timestamp_millis(millis.trunc() as i64))
}

fn from_text(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|dt| dt.and_utc())
}

/// Parse tool input; blank input means now
pub fn parse_input(input: &str) -> Option<DateTime<Utc>> {
    let text = input.trim();
    if text.is_empty() {
        return Some(Utc::now());
    }
    match from_timestamp(text) {
        Some(parsed) => parsed,
        None => from_text(text),
    }
}

/// Render a date in one of [`FORMATS`]; unknown names fall back to ISO 8601
pub fn format_date(date: &DateTime<Utc>, format: &str) -> String {
    match format {
        "Unix (ms)" => date.timestamp_millis().to_string(),
        "Unix (sec)" => date.timestamp_millis().div_euclid(1000).to_string(),
        "RFC 1123" => date.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
        "RFC 2822" => date.format("%a, %d %b %Y %H:%M:%S UTC").to_string(),
        "YYYY-MM-DD" => date.format("%Y-%m-%d").to_string(),
        "DD/MM/YYYY" => date.format("%d/%m/%Y").to_string(),
        "MM/DD/YYYY" => date.format("%m/%d/%Y").to_string(),
        _ => date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
    }
}

/// `datetime:converter`
pub fn convert(input: &str, options: &ToolOptions) -> HandlerResult {
    let format = options.str_or("format", "ISO 8601");
    let Some(date) = parse_input(input) else {
        return Ok(ToolResult::failure("Invalid date or timestamp"));
    };

    let formats: Map<String, Value> = FORMATS
        .iter()
        .map(|name| (name.to_string(), Value::from(format_date(&date, name))))
        .collect();
    let millis = date.timestamp_millis();

    Ok(ToolResult::success(format_date(&date, format))
        .with_metadata("formats", formats)
        .with_metadata("unixMs", millis)
        .with_metadata("unixSec", millis.div_euclid(1000)))
}

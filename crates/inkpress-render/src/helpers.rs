//! Filters and functions available to templates.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use minijinja::value::{Value, ValueKind};
use minijinja::{Environment, Error, ErrorKind};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left alone by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Register every helper on an environment.
pub fn register(env: &mut Environment<'_>) {
    env.add_filter("format_date", format_date);
    env.add_filter("format_timestamp", format_timestamp);
    env.add_filter("truncate", truncate);
    env.add_filter("split", split);
    env.add_filter("trim", trim);
    env.add_filter("strip_markdown", strip_markdown);
    env.add_filter("reading_time", reading_time);
    env.add_filter("format_reading_time", format_reading_time);
    env.add_filter("format_minutes", format_minutes);
    env.add_filter("urlencode_component", urlencode_component);
    env.add_filter("json", json);
    env.add_filter("category_name", category_name);

    env.add_function("canonical_url", canonical_url);
    env.add_function("contains", contains);
}

/// Text of a scalar value; `None` for undefined and none.
fn text_of(value: &Value) -> Option<String> {
    match value.kind() {
        ValueKind::Undefined | ValueKind::None => None,
        _ => Some(value.as_str().map(String::from).unwrap_or_else(|| value.to_string())),
    }
}

/// `2024-03-09` becomes `March 9, 2024`; timestamps also get the time of day.
pub fn format_date(value: Value) -> String {
    let Some(raw) = text_of(&value) else {
        return String::new();
    };
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%B %-d, %Y, %I:%M:%S %p").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format("%B %-d, %Y, %I:%M:%S %p").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%B %-d, %Y").to_string();
    }

    raw.to_string()
}

/// Millisecond epoch or RFC 3339 timestamp as `dd/mm/yyyy, HH:MM:SS` (UTC).
pub fn format_timestamp(value: Value) -> String {
    const FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

    if value.kind() == ValueKind::Number {
        if let Some(dt) = i64::try_from(value.clone())
            .ok()
            .and_then(DateTime::from_timestamp_millis)
        {
            return dt.format(FORMAT).to_string();
        }
    }

    let Some(raw) = text_of(&value) else {
        return String::new();
    };
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(dt) => dt.format(FORMAT).to_string(),
        Err(_) => raw,
    }
}

/// Cut to `length` characters, appending `...` when anything was removed.
pub fn truncate(value: Value, length: usize) -> String {
    let text = text_of(&value).unwrap_or_default();
    if text.chars().count() > length {
        let mut cut: String = text.chars().take(length).collect();
        cut.push_str("...");
        cut
    } else {
        text
    }
}

/// Turn an array, a JSON array string or a separated string into a list of
/// trimmed, non-empty values. The separator defaults to a comma.
pub fn split(value: Value, separator: Option<&str>) -> Vec<Value> {
    match value.kind() {
        ValueKind::Undefined | ValueKind::None => Vec::new(),
        ValueKind::Seq => value
            .try_iter()
            .map(|items| clean_items(items.collect()))
            .unwrap_or_default(),
        ValueKind::String => {
            let text = value.as_str().unwrap_or_default();

            if let Ok(serde_json::Value::Array(items)) = serde_json::from_str(text) {
                return clean_items(items.iter().map(Value::from_serialize).collect());
            }

            let separator = separator.filter(|s| !s.is_empty()).unwrap_or(",");
            text.split(separator)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(Value::from)
                .collect()
        }
        _ => vec![Value::from(value.to_string())],
    }
}

fn clean_items(items: Vec<Value>) -> Vec<Value> {
    items
        .into_iter()
        .map(|item| match item.as_str() {
            Some(s) => Value::from(s.trim()),
            None => item,
        })
        .filter(Value::is_true)
        .collect()
}

pub fn trim(value: Value) -> String {
    text_of(&value)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

pub fn strip_markdown(value: Value) -> String {
    text_of(&value)
        .map(|s| inkpress_markdown::strip_markdown(&s))
        .unwrap_or_default()
}

/// Minutes to read; 0 for empty input.
pub fn reading_time(value: Value) -> usize {
    text_of(&value)
        .map(|s| inkpress_markdown::estimate_reading_time(&s))
        .unwrap_or(0)
}

pub fn format_reading_time(value: Value) -> String {
    inkpress_markdown::format_reading_time(&text_of(&value).unwrap_or_default())
}

pub fn format_minutes(minutes: usize) -> String {
    inkpress_markdown::format_minutes(minutes)
}

/// Percent-encode like `encodeURIComponent`.
pub fn urlencode_component(value: Value) -> String {
    let text = text_of(&value).unwrap_or_default();
    utf8_percent_encode(&text, URI_COMPONENT).to_string()
}

pub fn json(value: Value) -> Result<String, Error> {
    serde_json::to_string(&value)
        .map_err(|e| Error::new(ErrorKind::InvalidOperation, format!("cannot serialize: {}", e)))
}

/// Name of the category whose `id` matches, or an empty string.
pub fn category_name(categories: Value, id: Value) -> String {
    if categories.kind() != ValueKind::Seq {
        return String::new();
    }
    let Ok(items) = categories.try_iter() else {
        return String::new();
    };

    items
        .filter(|category| category.get_attr("id").is_ok_and(|v| v == id))
        .find_map(|category| category.get_attr("name").ok())
        .and_then(|name| text_of(&name))
        .unwrap_or_default()
}

/// Absolute URL for a path on the site.
pub fn canonical_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Membership test; numeric strings also match numbers.
pub fn contains(value: Value, list: Value) -> bool {
    if list.kind() != ValueKind::Seq {
        return false;
    }
    let needle = text_of(&value)
        .and_then(|s| s.trim().parse::<i64>().ok())
        .map(Value::from)
        .unwrap_or(value);

    list.try_iter()
        .map(|mut items| items.any(|item| item == needle))
        .unwrap_or(false)
}

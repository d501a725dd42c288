//! The date boundary: every provider and caller date shape is handled here.
//!
//! The event provider returns dates as either a structured object
//! serialized as a quasi-JSON string (single quotes, keys like `start_date`
//! and `when`) or a free-text phrase like "Sat, Nov 22, 8 – 11 PM". Nothing
//! outside this module looks at a raw date.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use regex::Regex;

static DAY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{1,2})").expect("valid regex"));
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"20(\d{2})").expect("valid regex"));

/// Month tokens in match order. Short names listed first; a long name still
/// resolves through its prefix to the same month.
const MONTHS: [(&str, u32); 24] = [
    ("jan", 1),
    ("january", 1),
    ("feb", 2),
    ("february", 2),
    ("mar", 3),
    ("march", 3),
    ("apr", 4),
    ("april", 4),
    ("may", 5),
    ("jun", 6),
    ("june", 6),
    ("jul", 7),
    ("july", 7),
    ("aug", 8),
    ("august", 8),
    ("sep", 9),
    ("sept", 9),
    ("september", 9),
    ("oct", 10),
    ("october", 10),
    ("nov", 11),
    ("november", 11),
    ("dec", 12),
    ("december", 12),
];

const USER_DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%m-%d-%Y",
];

/// Parse whatever the provider put in its date field into a calendar date.
/// Returns None when no recognizable month/day is present; callers exclude
/// such records from range-filtered discovery.
pub fn parse_provider_date(raw: &str, now: DateTime<Utc>) -> Option<NaiveDate> {
    if raw.is_empty() {
        return None;
    }

    if raw.trim_start().starts_with('{') {
        let repaired = raw.replace('\'', "\"");
        if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(&repaired) {
            let field = ["start_date", "when"].iter().find_map(|key| {
                map.get(*key)
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
            });
            if let Some(text) = field {
                return parse_date_text(text, now);
            }
        }
    }

    parse_date_text(raw, now)
}

/// Parse a free-text date phrase by locating a month token and a 1–2 digit
/// day. The year defaults to the current one, advancing to next year when
/// the resulting instant is already behind `now`.
pub fn parse_date_text(text: &str, now: DateTime<Utc>) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }

    let mut clean = text.trim().to_string();

    // "Sat, Nov 22, 8 – 11 PM" → keep only the second comma segment
    let lower = clean.to_lowercase();
    if clean.contains(',') && MONTHS.iter().any(|(m, _)| lower.contains(m)) {
        let part = clean.split(',').nth(1).unwrap_or("");
        let part = part.split('–').next().unwrap_or("");
        let part = part.split("PM").next().unwrap_or("");
        let part = part.split("AM").next().unwrap_or("");
        clean = part.trim().to_string();
    }

    let lower = clean.to_lowercase();
    for (name, month) in MONTHS {
        if lower.contains(name) {
            let day: u32 = DAY_RE.captures(&clean)?.get(1)?.as_str().parse().ok()?;
            let proposed = NaiveDate::from_ymd_opt(now.year(), month, day)?;
            if proposed.and_time(NaiveTime::MIN).and_utc() < now {
                return NaiveDate::from_ymd_opt(now.year() + 1, month, day);
            }
            return Some(proposed);
        }
    }

    None
}

/// Render the provider's raw date as something readable. Quasi-JSON objects
/// prefer the descriptive `when` field; anything else passes through.
pub fn clean_date_display(raw: &str) -> String {
    if raw.is_empty() {
        return "Date not specified".to_string();
    }

    if raw.trim_start().starts_with('{') {
        let repaired = raw.replace('\'', "\"");
        if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(&repaired) {
            if let Some(when) = map
                .get("when")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
            {
                return when.to_string();
            }
            if let Some(start) = map
                .get("start_date")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
            {
                return format!("Starts: {start}");
            }
        }
    }

    raw.to_string()
}

/// Parse a caller-supplied date string: common numeric/long formats first,
/// then a month-token fallback with day and year defaults.
pub fn parse_user_date(text: &str, now: DateTime<Utc>) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in USER_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    let lower = trimmed.to_lowercase();
    for (name, month) in MONTHS {
        if lower.contains(name) {
            let day = DAY_RE
                .captures(&lower)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(1);
            let year = YEAR_RE
                .find(&lower)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or_else(|| now.year());
            return NaiveDate::from_ymd_opt(year, month, day);
        }
    }

    None
}

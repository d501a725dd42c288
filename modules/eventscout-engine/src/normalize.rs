//! Record normalization and validation: the first two pipeline stages.
//!
//! Raw provider records arrive with venue/location noise glued onto titles
//! and fields of unpredictable shape. Everything is collapsed into a typed
//! `EventFinding` here; records that cannot yield a usable name are dropped
//! silently.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveTime, Utc};
use eventscout_common::{EventCategory, EventFinding};
use regex::Regex;
use serpapi_client::{FlexField, RawEventRecord};

use crate::dates;

/// Trailing noise trimmed off event titles, applied in priority order:
/// "Jazz Night at Blue Hall" → "Jazz Night".
static TRIM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\s+at\s+.+$",
        r"(?i)\s+in\s+.+$",
        r"(?i)\s*-\s*.+$",
        r"(?i)\s*\|.*$",
        r"(?i)\s*@\s*.+$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Names that carry no identity on their own.
const GENERIC_NAMES: [&str; 4] = ["event", "events", "unknown", "unknown event"];

/// Strip trailing venue/location suffixes and collapse whitespace. Falls
/// back to the original title when trimming removes everything.
pub(crate) fn clean_event_name(title: &str) -> String {
    if title.is_empty() {
        return "Event".to_string();
    }

    let mut clean = title.to_string();
    for pattern in TRIM_PATTERNS.iter() {
        clean = pattern.replace(&clean, "").into_owned();
    }
    let clean = WHITESPACE_RE.replace_all(&clean, " ");
    let clean = clean.trim();

    if clean.is_empty() {
        title.to_string()
    } else {
        clean.to_string()
    }
}

/// A name is usable when it is at least three characters and not one of the
/// generic placeholders.
pub(crate) fn is_valid_name(name: &str) -> bool {
    if name.trim().len() < 3 {
        return false;
    }
    !GENERIC_NAMES.contains(&name.to_lowercase().as_str())
}

/// First comma segment of the address, when it looks like a real venue.
pub(crate) fn extract_venue(address: &str) -> String {
    if address.is_empty() {
        return "Various Venues".to_string();
    }
    let venue = address.split(',').next().unwrap_or("").trim();
    if venue.len() > 3 {
        venue.to_string()
    } else {
        "Various Venues".to_string()
    }
}

/// Last comma segment of the address, or the whole address when it has no
/// separable locality.
pub(crate) fn extract_location(address: &str) -> String {
    if address.is_empty() {
        return "Location not specified".to_string();
    }
    let parts: Vec<&str> = address.split(',').collect();
    if parts.len() > 1 {
        parts.last().map(|p| p.trim().to_string()).unwrap_or_default()
    } else {
        address.to_string()
    }
}

/// Normalize and validate one raw record into a finding. The start instant
/// is computed here exactly once; the hype score is filled in later by the
/// scoring stage. Returns None for records with no usable name.
pub(crate) fn event_from_record(
    record: &RawEventRecord,
    now: DateTime<Utc>,
) -> Option<EventFinding> {
    let title = record
        .title
        .as_ref()
        .and_then(FlexField::scalar)
        .unwrap_or_default();
    if title.is_empty() || title == "Unknown Event" {
        return None;
    }

    let raw_date = record
        .date
        .as_ref()
        .and_then(FlexField::scalar)
        .unwrap_or_else(|| "Date not specified".to_string());
    let address = record
        .address
        .as_ref()
        .and_then(FlexField::scalar)
        .unwrap_or_default();
    let link = record
        .link
        .as_ref()
        .and_then(FlexField::scalar)
        .unwrap_or_default();

    let name = clean_event_name(&title);
    if !is_valid_name(&name) {
        return None;
    }

    let starts_at = dates::parse_provider_date(&raw_date, now)
        .map(|d| d.and_time(NaiveTime::MIN).and_utc());

    Some(EventFinding {
        category: EventCategory::classify(&name),
        date_display: dates::clean_date_display(&raw_date),
        starts_at,
        venue: extract_venue(&address),
        location: extract_location(&address),
        source_url: link,
        name,
        hype_score: 0.0,
    })
}

use serde::Deserialize;

/// A provider field that arrives in an unpredictable shape: a plain string,
/// a list of strings (usually of length one), or a nested JSON value such as
/// the google_events date object. All shape tolerance lives here; callers
/// only ever see the canonical scalar.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FlexField {
    Text(String),
    Many(Vec<String>),
    Structured(serde_json::Value),
}

impl FlexField {
    /// Collapse to a canonical scalar. Lists yield their first element;
    /// structured values are re-serialized so downstream parsers see the
    /// same quasi-JSON string the provider sometimes sends directly.
    pub fn scalar(&self) -> Option<String> {
        match self {
            FlexField::Text(s) => Some(s.clone()),
            FlexField::Many(items) => items.first().cloned(),
            FlexField::Structured(value) => serde_json::to_string(value).ok(),
        }
    }
}

/// A single raw record from the google_events engine. Every field is
/// optional; the record pipeline decides what is usable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEventRecord {
    pub title: Option<FlexField>,
    pub date: Option<FlexField>,
    pub address: Option<FlexField>,
    pub link: Option<FlexField>,
}

/// Top-level search response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub events_results: Vec<RawEventRecord>,
}

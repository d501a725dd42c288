use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Coarse event classification derived from the event name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Music,
    Sports,
    Arts,
    Food,
    Festival,
    Conference,
    Other,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Music => "music",
            EventCategory::Sports => "sports",
            EventCategory::Arts => "arts",
            EventCategory::Food => "food",
            EventCategory::Festival => "festival",
            EventCategory::Conference => "conference",
            EventCategory::Other => "other",
        }
    }

    /// Classify free text into a category by keyword lookup.
    /// Categories are checked in a fixed order; the first match wins.
    pub fn classify(text: &str) -> Self {
        if text.is_empty() {
            return EventCategory::Other;
        }
        let text = text.to_lowercase();
        let tables: [(EventCategory, &[&str]); 6] = [
            (EventCategory::Music, &["concert", "music", "dj", "band", "live music"]),
            (EventCategory::Sports, &["sports", "game", "match", "tournament"]),
            (EventCategory::Arts, &["art", "theater", "exhibition", "gallery"]),
            (EventCategory::Food, &["food", "drink", "culinary", "wine"]),
            (EventCategory::Festival, &["festival", "cultural"]),
            (EventCategory::Conference, &["conference", "summit", "workshop"]),
        ];
        for (category, keywords) in tables {
            if keywords.iter().any(|k| text.contains(k)) {
                return category;
            }
        }
        EventCategory::Other
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "music" => Ok(EventCategory::Music),
            "sports" => Ok(EventCategory::Sports),
            "arts" => Ok(EventCategory::Arts),
            "food" => Ok(EventCategory::Food),
            "festival" => Ok(EventCategory::Festival),
            "conference" => Ok(EventCategory::Conference),
            "other" => Ok(EventCategory::Other),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// How strongly a post signals actual attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engagement {
    ConfirmedAttendance,
    Excited,
    Discussing,
}

impl Engagement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Engagement::ConfirmedAttendance => "confirmed_attendance",
            Engagement::Excited => "excited",
            Engagement::Discussing => "discussing",
        }
    }
}

/// A unique event surfaced by discovery, ranked by hype score.
#[derive(Debug, Clone, Serialize)]
pub struct EventFinding {
    pub name: String,
    /// Human-readable date as the provider phrased it.
    pub date_display: String,
    /// Parsed start instant. Computed once during the pipeline's date stage
    /// and never re-derived after acceptance.
    pub starts_at: Option<DateTime<Utc>>,
    pub venue: String,
    pub location: String,
    pub category: EventCategory,
    pub source_url: String,
    /// Heuristic ranking signal, always in [0, 1].
    pub hype_score: f32,
}

/// A likely attendee surfaced from social search, ranked by relevance score.
#[derive(Debug, Clone, Serialize)]
pub struct AttendeeFinding {
    /// Handle including the leading `@`.
    pub handle: String,
    pub display_name: String,
    pub bio: String,
    pub location: String,
    pub followers_count: u64,
    pub verified: bool,
    pub engagement: Engagement,
    /// Post text truncated to 100 characters.
    pub post_excerpt: String,
    pub posted_at: Option<DateTime<Utc>>,
    pub post_url: String,
    /// Heuristic ranking signal, always in [0, 1].
    pub relevance_score: f32,
}

/// What to look for when discovering events.
#[derive(Debug, Clone, TypedBuilder)]
pub struct EventCriteria {
    #[builder(setter(into))]
    pub location: String,
    /// Inclusive start of the accepted date range.
    pub start: NaiveDate,
    /// Inclusive end of the accepted date range.
    pub end: NaiveDate,
    #[builder(default)]
    pub categories: Vec<EventCategory>,
}

/// What to look for when discovering attendees of a named event.
#[derive(Debug, Clone, TypedBuilder)]
pub struct AttendeeCriteria {
    #[builder(setter(into))]
    pub event_name: String,
    /// Optional display date used to sharpen exact-match queries.
    #[builder(default, setter(strip_option, into))]
    pub event_date: Option<String>,
}

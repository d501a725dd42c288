//! Query planning: escalating phases of provider queries.
//!
//! A plan bounds total API spend by construction: each phase carries a hard
//! cap on how many of its queries may be issued, so the number of provider
//! calls per run is a small constant no matter how many results the caller
//! asked for.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::Datelike;
use eventscout_common::{AttendeeCriteria, EventCategory, EventCriteria};
use regex::Regex;

/// One query the orchestrator may issue, tagged with why it was planned.
#[derive(Debug, Clone)]
pub struct PlannedQuery {
    pub label: &'static str,
    pub text: String,
}

/// An ordered batch of queries of similar precision. Phases are consumed in
/// order of increasing breadth until enough results accumulate.
#[derive(Debug)]
pub struct QueryPhase {
    pub name: &'static str,
    pub queries: Vec<PlannedQuery>,
    /// Hard cap on queries issued from this phase.
    pub max_queries: usize,
    /// Result hints request `still_needed * result_multiplier` records.
    pub result_multiplier: usize,
}

/// Ordered phases for one discovery run.
#[derive(Debug)]
pub struct QueryPlan {
    pub phases: Vec<QueryPhase>,
}

impl QueryPlan {
    /// Upper bound on provider calls this plan can cause.
    pub fn query_cap(&self) -> usize {
        self.phases
            .iter()
            .map(|p| p.queries.len().min(p.max_queries))
            .sum()
    }
}

const EVENT_PHASE_CAP: usize = 25;
const EXACT_PHASE_CAP: usize = 3;
const KEYWORD_PHASE_CAP: usize = 3;
const BROAD_PHASE_CAP: usize = 2;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

const STOP_WORDS: [&str; 14] = [
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "a", "an",
];

/// Plan the single date-targeted phase for event discovery: per-month
/// queries across the requested range, then range/year generics, then
/// per-category queries. Deduplicated as strings, order preserved.
pub fn plan_event_queries(criteria: &EventCriteria) -> QueryPlan {
    let location = &criteria.location;
    let year = criteria.start.year();
    let mut queries = Vec::new();

    for (y, m) in month_span(
        (criteria.start.year(), criteria.start.month()),
        (criteria.end.year(), criteria.end.month()),
    ) {
        let month = MONTH_NAMES[(m - 1) as usize];
        queries.push(planned("month", format!("events {location} {month} {y}")));
        queries.push(planned("month_alt", format!("{month} events {location} {y}")));
        queries.push(planned(
            "upcoming_month",
            format!("upcoming events {location} {month} {y}"),
        ));
        queries.push(planned(
            "things_to_do",
            format!("things to do {location} {month} {y}"),
        ));
    }

    queries.push(planned(
        "range",
        format!(
            "events {location} {} to {}",
            criteria.start.format("%B %d"),
            criteria.end.format("%B %d %Y"),
        ),
    ));
    queries.push(planned("year", format!("{location} events {year}")));
    queries.push(planned(
        "upcoming_year",
        format!("upcoming events {location} {year}"),
    ));

    for category in &criteria.categories {
        let start_month = MONTH_NAMES[(criteria.start.month() - 1) as usize];
        queries.push(planned(
            "category_year",
            format!("{category} events {location} {year}"),
        ));
        queries.push(planned(
            "category_month",
            format!("{category} {location} {start_month} {year}"),
        ));
    }

    QueryPlan {
        phases: vec![QueryPhase {
            name: "date_targeted",
            queries: dedup_queries(queries),
            max_queries: EVENT_PHASE_CAP,
            result_multiplier: 1,
        }],
    }
}

/// Plan the single broad phase for trending event discovery (no date
/// filter): popularity-phrased queries plus per-category variants.
pub fn plan_trending_queries(
    location: &str,
    categories: &[EventCategory],
    year: i32,
) -> QueryPlan {
    let mut queries = vec![
        planned("popular", format!("popular events {location}")),
        planned("trending", format!("trending events {location}")),
        planned("best", format!("best events {location}")),
        planned("top", format!("top events {location}")),
        planned("must_see", format!("must-see events {location}")),
        planned("major", format!("major events {location}")),
        planned("featured", format!("featured events {location}")),
        planned("upcoming", format!("upcoming events {location}")),
        planned("weekend", format!("this weekend {location}")),
        planned("year", format!("events {location} {year}")),
    ];

    for category in categories {
        queries.push(planned(
            "category_popular",
            format!("popular {category} events {location}"),
        ));
        queries.push(planned("category_best", format!("best {category} {location}")));
        queries.push(planned(
            "category_top",
            format!("top {category} events {location}"),
        ));
    }

    QueryPlan {
        phases: vec![QueryPhase {
            name: "trending",
            queries: dedup_queries(queries),
            max_queries: EVENT_PHASE_CAP,
            result_multiplier: 1,
        }],
    }
}

/// Plan the three escalating phases for attendee discovery: exact quoted
/// matches, then keyword expansion, then broad OR queries.
pub fn plan_attendee_queries(criteria: &AttendeeCriteria) -> QueryPlan {
    let clean = clean_for_search(&criteria.event_name);
    let keywords = extract_keywords(&criteria.event_name);

    let mut exact = vec![
        planned("exact", format!("\"{clean}\"")),
        planned("event", format!("\"{clean}\" event")),
        planned("concert", format!("\"{clean}\" concert")),
    ];
    if let Some(date) = &criteria.event_date {
        exact.push(planned("dated", format!("\"{clean}\" {date}")));
    }

    let mut keyword = Vec::new();
    if keywords.len() >= 2 {
        keyword.push(planned(
            "keyword_pair",
            format!("\"{} {}\"", keywords[0], keywords[1]),
        ));
    }
    keyword.push(planned("main_keyword", format!("\"{}\"", keywords[0])));

    let second = keywords.get(1).unwrap_or(&keywords[0]);
    let broad = vec![
        planned("broad", keywords[0].clone()),
        planned("very_broad", format!("{} OR {}", keywords[0], second)),
    ];

    QueryPlan {
        phases: vec![
            QueryPhase {
                name: "exact",
                queries: exact,
                max_queries: EXACT_PHASE_CAP,
                result_multiplier: 3,
            },
            QueryPhase {
                name: "keyword",
                queries: keyword,
                max_queries: KEYWORD_PHASE_CAP,
                result_multiplier: 2,
            },
            QueryPhase {
                name: "broad",
                queries: broad,
                max_queries: BROAD_PHASE_CAP,
                result_multiplier: 1,
            },
        ],
    }
}

/// Extract ranked keywords from an event name: punctuation stripped,
/// stop words and tokens of two characters or fewer removed. Never empty;
/// degenerates to the first word of the original name.
pub(crate) fn extract_keywords(event_name: &str) -> Vec<String> {
    let clean = NON_WORD_RE.replace_all(event_name, " ");
    let keywords: Vec<String> = clean
        .split_whitespace()
        .filter(|w| w.len() > 2 && !STOP_WORDS.contains(&w.to_lowercase().as_str()))
        .map(|w| w.to_lowercase())
        .collect();

    if keywords.is_empty() {
        vec![event_name
            .split_whitespace()
            .next()
            .unwrap_or("event")
            .to_lowercase()]
    } else {
        keywords
    }
}

/// Strip punctuation for use inside a quoted search term.
pub(crate) fn clean_for_search(event_name: &str) -> String {
    let clean = NON_WORD_RE.replace_all(event_name, " ");
    let clean = WHITESPACE_RE.replace_all(&clean, " ");
    let clean = clean.trim();
    if clean.is_empty() {
        "event".to_string()
    } else {
        clean.to_string()
    }
}

fn planned(label: &'static str, text: String) -> PlannedQuery {
    PlannedQuery { label, text }
}

/// Order-preserving string dedup.
fn dedup_queries(queries: Vec<PlannedQuery>) -> Vec<PlannedQuery> {
    let mut seen = HashSet::new();
    queries
        .into_iter()
        .filter(|q| seen.insert(q.text.clone()))
        .collect()
}

/// Inclusive (year, month) walk from start to end.
fn month_span(start: (i32, u32), end: (i32, u32)) -> Vec<(i32, u32)> {
    let mut months = Vec::new();
    let (mut y, mut m) = start;
    while (y, m) <= end {
        months.push((y, m));
        if m == 12 {
            y += 1;
            m = 1;
        } else {
            m += 1;
        }
    }
    months
}

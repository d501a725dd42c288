//! Discovery property tests: both engines driven end-to-end against
//! scripted providers. No network and no clock control; date-sensitive cases
//! derive their expected range from the same parser the pipeline uses.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};

use eventscout_common::{AttendeeCriteria, EventCriteria};
use eventscout_engine::attendees::AttendeeEngine;
use eventscout_engine::dates::parse_provider_date;
use eventscout_engine::events::EventEngine;
use eventscout_engine::rate_limit::{Endpoint, RateLimiter};
use eventscout_engine::testing::{
    event_record, search_batch, tweet, user, FailingEventSearcher, ScriptedEventSearcher,
    ScriptedTweetSearcher,
};

fn limiter() -> Arc<RateLimiter> {
    Arc::new(RateLimiter::new())
}

/// Criteria covering the whole of the November the date parser would assign
/// to "Nov 15", so scripted records dated "Nov 15" land inside the range on
/// any test run date. Records that must stay in range all use that date;
/// only names vary.
fn november_criteria() -> EventCriteria {
    let nov15 = parse_provider_date("Nov 15", Utc::now()).expect("parseable");
    EventCriteria::builder()
        .location("Austin")
        .start(NaiveDate::from_ymd_opt(nov15.year(), 11, 1).unwrap())
        .end(NaiveDate::from_ymd_opt(nov15.year(), 11, 30).unwrap())
        .build()
}

fn exhaust(limiter: &RateLimiter, endpoint: Endpoint) {
    while limiter.try_acquire(endpoint) {}
}

// ---------------------------------------------------------------------------
// Event discovery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn returns_at_most_target_events() {
    let batch = vec![
        event_record("Harvest Festival", "Nov 15", "Riverside Park, Austin", ""),
        event_record("Winter Gala", "Nov 15", "City Hall, Austin", ""),
        event_record("Championship Final", "Nov 15", "City Stadium, Austin", ""),
        event_record("Food Truck Rally", "Nov 15", "5th Street, Austin", ""),
        event_record("Jazz Concert", "Nov 15", "Blue Note, Austin", ""),
    ];
    let searcher = Arc::new(ScriptedEventSearcher::new(vec![batch]));
    let engine = EventEngine::new(Some(searcher), limiter());

    let findings = engine.discover(&november_criteria(), 3).await;
    assert_eq!(findings.len(), 3);
}

#[tokio::test]
async fn returns_fewer_when_provider_has_less() {
    let batch = vec![
        event_record("Harvest Festival", "Nov 15", "Riverside Park, Austin", ""),
        event_record("Winter Gala", "Nov 15", "City Hall, Austin", ""),
    ];
    let searcher = Arc::new(ScriptedEventSearcher::new(vec![batch]));
    let engine = EventEngine::new(Some(searcher), limiter());

    let findings = engine.discover(&november_criteria(), 10).await;
    assert_eq!(findings.len(), 2);
}

#[tokio::test]
async fn duplicate_records_collapse_to_first_seen() {
    let record = event_record("Harvest Festival", "Nov 15", "Riverside Park, Austin", "");
    let searcher = Arc::new(ScriptedEventSearcher::new(vec![
        vec![record.clone(), record.clone()],
        vec![record.clone()],
        // Same identity through punctuation and venue-suffix noise
        vec![event_record(
            "Harvest Festival! at Riverside",
            "Nov 15",
            "Riverside Park, Austin",
            "",
        )],
    ]));
    let engine = EventEngine::new(Some(searcher), limiter());

    let findings = engine.discover(&november_criteria(), 10).await;
    assert_eq!(findings.len(), 1);
}

#[tokio::test]
async fn scores_are_in_unit_interval_and_sorted_descending() {
    let batch = vec![
        event_record("Quiet Meetup", "Nov 15", "Side Room, Austin", ""),
        event_record(
            "Championship Festival Gala",
            "Nov 15",
            "City Stadium Arena, Austin",
            "",
        ),
        event_record("Winter Gala", "Nov 15", "City Hall, Austin", ""),
    ];
    let searcher = Arc::new(ScriptedEventSearcher::new(vec![batch]));
    let engine = EventEngine::new(Some(searcher), limiter());

    let findings = engine.discover(&november_criteria(), 10).await;
    assert!(!findings.is_empty());
    for f in &findings {
        assert!(f.hype_score >= 0.0 && f.hype_score <= 1.0, "{}", f.hype_score);
    }
    for pair in findings.windows(2) {
        assert!(pair[0].hype_score >= pair[1].hype_score);
    }
    assert_eq!(findings[0].name, "Championship Festival Gala");
}

#[tokio::test]
async fn equal_scores_keep_discovery_order() {
    let batch = vec![
        event_record("Canasta Night", "Nov 15", "", ""),
        event_record("Domino Night", "Nov 15", "", ""),
    ];
    let searcher = Arc::new(ScriptedEventSearcher::new(vec![batch]));
    let engine = EventEngine::new(Some(searcher), limiter());

    let findings = engine.discover(&november_criteria(), 10).await;
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].hype_score, findings[1].hype_score);
    assert_eq!(findings[0].name, "Canasta Night");
    assert_eq!(findings[1].name, "Domino Night");
}

#[tokio::test]
async fn date_range_filter_excludes_out_of_range_and_unparseable() {
    let batch = vec![
        event_record("Harvest Festival", "Nov 15", "", ""),
        event_record("December Gala", "Dec 1", "", ""),
        event_record("Mystery Evening", "sometime soon", "", ""),
    ];
    let searcher = Arc::new(ScriptedEventSearcher::new(vec![batch]));
    let engine = EventEngine::new(Some(searcher), limiter());

    let findings = engine.discover(&november_criteria(), 10).await;
    let names: Vec<&str> = findings.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Harvest Festival"]);
}

#[tokio::test]
async fn generic_names_never_appear_in_output() {
    let batch = vec![
        event_record("Event", "Nov 15", "", ""),
        event_record("EVENTS", "Nov 15", "", ""),
        event_record("unknown event", "Nov 15", "", ""),
        event_record("Harvest Festival", "Nov 15", "", ""),
    ];
    let searcher = Arc::new(ScriptedEventSearcher::new(vec![batch]));
    let engine = EventEngine::new(Some(searcher), limiter());

    let findings = engine.discover(&november_criteria(), 10).await;
    let names: Vec<&str> = findings.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Harvest Festival"]);
}

#[tokio::test]
async fn collection_stops_once_the_pool_is_full() {
    // Ten distinct in-range events in the first batch; with target 1 the
    // pool caps at 2 unique, so a single query satisfies the run.
    let batch: Vec<_> = (1..=10)
        .map(|n| event_record(&format!("Festival Number {n}"), "Nov 15", "", ""))
        .collect();
    let searcher = Arc::new(ScriptedEventSearcher::new(vec![batch]));
    let engine = EventEngine::new(Some(searcher.clone()), limiter());

    let findings = engine.discover(&november_criteria(), 1).await;
    assert_eq!(findings.len(), 1);
    assert_eq!(searcher.calls(), 1);
}

#[tokio::test]
async fn quota_denial_abandons_the_run_before_any_call() {
    let shared = limiter();
    exhaust(&shared, Endpoint::EventSearch);
    let searcher = Arc::new(ScriptedEventSearcher::new(vec![vec![event_record(
        "Harvest Festival",
        "Nov 15",
        "",
        "",
    )]]));
    let engine = EventEngine::new(Some(searcher.clone()), shared);

    let findings = engine.discover(&november_criteria(), 5).await;
    assert!(findings.is_empty());
    assert_eq!(searcher.calls(), 0, "denied queries must not reach the provider");
}

#[tokio::test]
async fn provider_failures_yield_empty_not_panic() {
    let engine = EventEngine::new(Some(Arc::new(FailingEventSearcher)), limiter());
    let findings = engine.discover(&november_criteria(), 5).await;
    assert!(findings.is_empty());
}

#[tokio::test]
async fn unconfigured_event_engine_short_circuits() {
    let engine = EventEngine::new(None, limiter());
    let findings = engine.discover(&november_criteria(), 5).await;
    assert!(findings.is_empty());
}

#[tokio::test]
async fn trending_discovery_keeps_undated_events() {
    let batch = vec![
        event_record("Harvest Festival", "sometime soon", "", ""),
        event_record("Winter Gala", "Nov 22", "", ""),
    ];
    let searcher = Arc::new(ScriptedEventSearcher::new(vec![batch]));
    let engine = EventEngine::new(Some(searcher), limiter());

    let findings = engine.discover_trending("Austin", &[], 10).await;
    assert_eq!(findings.len(), 2);
}

// ---------------------------------------------------------------------------
// Attendee discovery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_phase_fill_skips_later_phases() {
    let batch = search_batch(
        vec![
            tweet("t1", "attending Hyper Expo tomorrow", "u1"),
            tweet("t2", "Hyper Expo is going to be great", "u2"),
            tweet("t3", "can't wait for Hyper Expo", "u3"),
        ],
        vec![
            user("u1", "alice", "Alice", 100),
            user("u2", "bob", "Bob", 200),
            user("u3", "carol", "Carol", 300),
        ],
    );
    let searcher = Arc::new(ScriptedTweetSearcher::new(vec![batch]));
    let engine = AttendeeEngine::new(Some(searcher.clone()), limiter());

    let criteria = AttendeeCriteria::builder().event_name("Hyper Expo").build();
    let findings = engine.discover(&criteria, 3).await;

    assert_eq!(findings.len(), 3);
    assert_eq!(
        searcher.calls(),
        1,
        "no later-phase query may be issued once the target is reached"
    );
}

#[tokio::test]
async fn underfilled_run_escalates_through_all_phases() {
    let batch = search_batch(
        vec![tweet("t1", "attending Hyper Expo", "u1")],
        vec![user("u1", "alice", "Alice", 100)],
    );
    let searcher = Arc::new(ScriptedTweetSearcher::new(vec![batch]));
    let engine = AttendeeEngine::new(Some(searcher.clone()), limiter());

    let criteria = AttendeeCriteria::builder().event_name("Hyper Expo").build();
    let findings = engine.discover(&criteria, 5).await;

    assert_eq!(findings.len(), 1);
    // exact (3) + keyword (2: pair + main) + broad (2), all exhausted
    assert_eq!(searcher.calls(), 7);
}

#[tokio::test]
async fn attendees_deduplicate_by_username() {
    let first = search_batch(
        vec![tweet("t1", "attending Hyper Expo", "u1")],
        vec![user("u1", "alice", "Alice", 100)],
    );
    let second = search_batch(
        vec![
            tweet("t9", "Hyper Expo again!", "u1"),
            tweet("t2", "Hyper Expo hype", "u2"),
        ],
        vec![
            user("u1", "alice", "Alice", 100),
            user("u2", "bob", "Bob", 200),
        ],
    );
    let searcher = Arc::new(ScriptedTweetSearcher::new(vec![first, second]));
    let engine = AttendeeEngine::new(Some(searcher), limiter());

    let criteria = AttendeeCriteria::builder().event_name("Hyper Expo").build();
    let findings = engine.discover(&criteria, 2).await;

    assert_eq!(findings.len(), 2);
    let handles: Vec<&str> = findings.iter().map(|f| f.handle.as_str()).collect();
    assert!(handles.contains(&"@alice"));
    assert!(handles.contains(&"@bob"));
}

#[tokio::test]
async fn irrelevant_posts_fall_below_the_floor() {
    let batch = search_batch(
        vec![
            tweet("t1", "just had lunch downtown", "u1"),
            tweet("t2", "attending Hyper Expo", "u2"),
        ],
        vec![
            user("u1", "alice", "Alice", 100),
            user("u2", "bob", "Bob", 200),
        ],
    );
    let searcher = Arc::new(ScriptedTweetSearcher::new(vec![batch]));
    let engine = AttendeeEngine::new(Some(searcher), limiter());

    let criteria = AttendeeCriteria::builder().event_name("Hyper Expo").build();
    let findings = engine.discover(&criteria, 5).await;

    let handles: Vec<&str> = findings.iter().map(|f| f.handle.as_str()).collect();
    assert_eq!(handles, vec!["@bob"]);
}

#[tokio::test]
async fn attendee_scores_sorted_descending_within_unit_interval() {
    let batch = search_batch(
        vec![
            tweet("t1", "heard there is an expo", "u1"),
            tweet("t2", "attending Hyper Expo, see you there", "u2"),
            tweet("t3", "Hyper Expo lineup is out", "u3"),
        ],
        vec![
            user("u1", "alice", "Alice", 100),
            user("u2", "bob", "Bob", 200),
            user("u3", "carol", "Carol", 300),
        ],
    );
    let searcher = Arc::new(ScriptedTweetSearcher::new(vec![batch]));
    let engine = AttendeeEngine::new(Some(searcher), limiter());

    let criteria = AttendeeCriteria::builder().event_name("Hyper Expo").build();
    let findings = engine.discover(&criteria, 3).await;

    for f in &findings {
        assert!(f.relevance_score >= 0.0 && f.relevance_score <= 1.0);
    }
    for pair in findings.windows(2) {
        assert!(pair[0].relevance_score >= pair[1].relevance_score);
    }
    assert_eq!(findings[0].handle, "@bob");
}

#[tokio::test]
async fn quota_denial_reflects_in_usage_stats() {
    let shared = limiter();
    exhaust(&shared, Endpoint::TweetSearch);
    let searcher = Arc::new(ScriptedTweetSearcher::new(vec![]));
    let engine = AttendeeEngine::new(Some(searcher.clone()), shared);

    let criteria = AttendeeCriteria::builder().event_name("Hyper Expo").build();
    let findings = engine.discover(&criteria, 5).await;

    assert!(findings.is_empty());
    assert_eq!(searcher.calls(), 0);
    let usage = engine.usage_stats();
    assert_eq!(usage.searches_remaining, 0);
    assert_eq!(usage.searches_used, usage.searches_limit);
}

#[tokio::test]
async fn shared_limiter_spans_event_and_attendee_runs() {
    let shared = limiter();
    let event_searcher = Arc::new(ScriptedEventSearcher::new(vec![]));
    let tweet_searcher = Arc::new(ScriptedTweetSearcher::new(vec![]));
    let events = EventEngine::new(Some(event_searcher), shared.clone());
    let attendees = AttendeeEngine::new(Some(tweet_searcher), shared.clone());

    events.discover(&november_criteria(), 1).await;
    let criteria = AttendeeCriteria::builder().event_name("Hyper Expo").build();
    attendees.discover(&criteria, 1).await;

    let status = shared.status();
    assert!(status[&Endpoint::EventSearch].remaining < status[&Endpoint::EventSearch].limit);
    assert!(status[&Endpoint::TweetSearch].remaining < status[&Endpoint::TweetSearch].limit);
}

#[tokio::test]
async fn unconfigured_attendee_engine_short_circuits() {
    let engine = AttendeeEngine::new(None, limiter());
    let criteria = AttendeeCriteria::builder().event_name("Hyper Expo").build();
    let findings = engine.discover(&criteria, 5).await;
    assert!(findings.is_empty());
    assert_eq!(engine.usage_stats().searches_used, 0);
}

//! Heuristic ranking signals. The vocabularies and weights are data, not
//! control flow; tune them here without touching orchestration.

use eventscout_common::{Engagement, EventCategory};

use crate::planner::extract_keywords;

/// Name tokens that mark a high-profile event. Each match adds 0.1.
const HYPE_KEYWORDS: [&str; 10] = [
    "festival",
    "concert",
    "championship",
    "tournament",
    "expo",
    "summit",
    "conference",
    "awards",
    "gala",
    "premiere",
];

/// Venue tokens that mark a prestige location. Each match adds 0.15.
const PRESTIGE_VENUES: [&str; 5] = ["stadium", "arena", "center", "garden", "hall"];

/// Phrases that signal engagement with an event. First match adds 0.1.
const ENGAGEMENT_PHRASES: [&str; 5] = [
    "attending",
    "going to",
    "see you at",
    "excited for",
    "can't wait for",
];

/// Generic event-context words. First match adds 0.05.
const CONTEXT_WORDS: [&str; 5] = ["event", "concert", "festival", "show", "party"];

/// Minimum relevance for an attendee to be kept at all. Deliberately
/// permissive so the quota is not under-filled.
pub(crate) const RELEVANCE_FLOOR: f32 = 0.05;

fn category_weight(category: EventCategory) -> f32 {
    match category {
        EventCategory::Festival => 0.4,
        EventCategory::Sports => 0.35,
        EventCategory::Music => 0.3,
        EventCategory::Arts => 0.25,
        EventCategory::Conference => 0.2,
        EventCategory::Food => 0.15,
        EventCategory::Other => 0.1,
    }
}

/// Hype score for an event, always in [0, 1].
pub fn hype_score(name: &str, venue: &str, category: EventCategory) -> f32 {
    let mut score = 0.0_f32;

    let name = name.to_lowercase();
    for keyword in HYPE_KEYWORDS {
        if name.contains(keyword) {
            score += 0.1;
        }
    }

    let venue = venue.to_lowercase();
    for token in PRESTIGE_VENUES {
        if venue.contains(token) {
            score += 0.15;
        }
    }

    score += category_weight(category);
    score.clamp(0.0, 1.0)
}

/// Relevance of a post to an event, always in [0, 1]: verbatim name match
/// dominates, keyword overlap and engagement language refine.
pub fn relevance_score(post_text: &str, event_name: &str) -> f32 {
    let text = post_text.to_lowercase();
    let mut score = 0.0_f32;

    if text.contains(&event_name.to_lowercase()) {
        score += 0.6;
    }

    let keywords = extract_keywords(event_name);
    let matched = keywords.iter().filter(|k| text.contains(k.as_str())).count();
    score += (matched as f32 * 0.1).min(0.3);

    if ENGAGEMENT_PHRASES.iter().any(|p| text.contains(p)) {
        score += 0.1;
    }

    if CONTEXT_WORDS.iter().any(|w| text.contains(w)) {
        score += 0.05;
    }

    score.clamp(0.0, 1.0)
}

/// Classify how a post engages with the event.
pub fn classify_engagement(post_text: &str) -> Engagement {
    let text = post_text.to_lowercase();
    if ["attending", "going to", "will be there"]
        .iter()
        .any(|w| text.contains(w))
    {
        Engagement::ConfirmedAttendance
    } else if ["excited for", "can't wait for"].iter().any(|w| text.contains(w)) {
        Engagement::Excited
    } else {
        Engagement::Discussing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- hype_score ---

    #[test]
    fn category_weight_alone_sets_the_floor() {
        assert!((hype_score("Quiet Gathering", "", EventCategory::Other) - 0.1).abs() < 1e-6);
        assert!((hype_score("Quiet Gathering", "", EventCategory::Festival) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn hype_keywords_and_venue_stack() {
        // festival + gala in name, stadium in venue, festival category
        let score = hype_score("Festival Gala", "City Stadium", EventCategory::Festival);
        assert!((score - (0.1 + 0.1 + 0.15 + 0.4)).abs() < 1e-6);
    }

    #[test]
    fn hype_score_clamps_at_one() {
        let score = hype_score(
            "Festival Concert Championship Tournament Expo Summit Conference Awards Gala Premiere",
            "Stadium Arena Center Garden Hall",
            EventCategory::Festival,
        );
        assert!((score - 1.0).abs() < 1e-6);
    }

    // --- relevance_score ---

    #[test]
    fn verbatim_name_match_dominates() {
        let score = relevance_score("so ready for Hyper Expo this weekend", "Hyper Expo");
        // 0.6 exact + 0.2 keyword overlap (hyper, expo); no engagement or
        // context language
        assert!((score - 0.8).abs() < 1e-6);
    }

    #[test]
    fn keyword_overlap_is_capped() {
        let score = relevance_score(
            "grand jazz festival riverside lineup",
            "Grand Jazz Festival Riverside Nights",
        );
        // 4 keyword matches would be 0.4, capped at 0.3; no verbatim match;
        // "festival" is a context word (+0.05)
        assert!((score - 0.35).abs() < 1e-6);
    }

    #[test]
    fn engagement_phrase_counts_once() {
        let a = relevance_score("attending tomorrow", "Hyper Expo");
        let b = relevance_score("attending and excited for it", "Hyper Expo");
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn unrelated_post_scores_zero() {
        assert_eq!(relevance_score("just had lunch downtown", "Hyper Expo"), 0.0);
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let score = relevance_score(
            "attending Hyper Expo event, can't wait for this expo hyper party show",
            "Hyper Expo",
        );
        assert!(score <= 1.0 && score >= 0.0);
    }

    // --- classify_engagement ---

    #[test]
    fn attendance_language_is_confirmed() {
        assert_eq!(
            classify_engagement("I'm going to the gala"),
            Engagement::ConfirmedAttendance
        );
        assert_eq!(
            classify_engagement("will be there with friends"),
            Engagement::ConfirmedAttendance
        );
    }

    #[test]
    fn excitement_language_is_excited() {
        assert_eq!(classify_engagement("can't wait for this"), Engagement::Excited);
    }

    #[test]
    fn attendance_wins_over_excitement() {
        assert_eq!(
            classify_engagement("excited for it, going to be great"),
            Engagement::ConfirmedAttendance
        );
    }

    #[test]
    fn anything_else_is_discussing() {
        assert_eq!(classify_engagement("heard about this"), Engagement::Discussing);
    }
}

//! Attendee discovery orchestration: escalating query phases against the
//! social search provider, stopping the moment the target count is reached.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use eventscout_common::{AttendeeCriteria, AttendeeFinding};
use tracing::{info, warn};
use twitter_client::{Tweet, TwitterUser};
use uuid::Uuid;

use crate::gateway::{FetchOutcome, TweetGateway, TweetSearcher};
use crate::planner;
use crate::rate_limit::{Endpoint, RateLimiter};
use crate::scoring::{classify_engagement, relevance_score, RELEVANCE_FLOOR};

/// Post excerpts are capped at this many characters.
const EXCERPT_CHARS: usize = 100;

/// Stats from one attendee discovery run.
#[derive(Debug, Default)]
pub struct AttendeeDiscoveryStats {
    pub queries_issued: u32,
    pub posts_seen: u32,
    pub below_threshold: u32,
    pub duplicates_skipped: u32,
    pub unique_collected: u32,
    pub quota_denied: bool,
}

impl fmt::Display for AttendeeDiscoveryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "queries={}, posts={}, below_threshold={}, dupes={}, unique={}{}",
            self.queries_issued,
            self.posts_seen,
            self.below_threshold,
            self.duplicates_skipped,
            self.unique_collected,
            if self.quota_denied { ", quota_denied" } else { "" },
        )
    }
}

/// Mirror of the limiter's bookkeeping for the social search window,
/// exposed for external reporting.
#[derive(Debug, Clone)]
pub struct UsageStats {
    pub searches_remaining: u32,
    pub searches_used: u32,
    pub searches_limit: u32,
    pub reset_in_minutes: i64,
}

/// Discovers likely attendees of a named event. Built without a searcher it
/// answers every request with an empty result.
pub struct AttendeeEngine {
    gateway: Option<TweetGateway>,
    limiter: Arc<RateLimiter>,
}

impl AttendeeEngine {
    pub fn new(searcher: Option<Arc<dyn TweetSearcher>>, limiter: Arc<RateLimiter>) -> Self {
        if searcher.is_none() {
            warn!("Social search provider not configured; attendee discovery will return nothing");
        }
        Self {
            gateway: searcher.map(|s| TweetGateway::new(s, limiter.clone())),
            limiter,
        }
    }

    /// Discover up to `target` unique attendees, ranked by relevance score
    /// descending. Phases escalate from exact-match to broad queries; later
    /// phases are skipped entirely once the target is reached.
    pub async fn discover(
        &self,
        criteria: &AttendeeCriteria,
        target: usize,
    ) -> Vec<AttendeeFinding> {
        let Some(gateway) = &self.gateway else {
            return Vec::new();
        };

        let run_id = Uuid::new_v4();
        info!(
            %run_id,
            event = criteria.event_name.as_str(),
            target,
            "Discovering attendees"
        );

        let plan = planner::plan_attendee_queries(criteria);
        let mut stats = AttendeeDiscoveryStats::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut findings: Vec<AttendeeFinding> = Vec::new();

        'phases: for phase in &plan.phases {
            for query in phase.queries.iter().take(phase.max_queries) {
                if findings.len() >= target {
                    break 'phases;
                }

                let hint = (target * phase.result_multiplier) as u32;
                stats.queries_issued += 1;

                let search = match gateway.fetch(&query.text, hint).await {
                    FetchOutcome::Fetched(search) => search,
                    FetchOutcome::Failed => continue,
                    FetchOutcome::Denied => {
                        stats.quota_denied = true;
                        warn!(
                            query = query.text.as_str(),
                            "Quota exhausted; abandoning remaining queries"
                        );
                        break 'phases;
                    }
                };

                for tweet in &search.tweets {
                    stats.posts_seen += 1;

                    let Some(author_id) = tweet.author_id.as_deref() else {
                        continue;
                    };
                    let Some(user) = search.user(author_id) else {
                        continue;
                    };

                    let relevance = relevance_score(&tweet.text, &criteria.event_name);
                    if relevance < RELEVANCE_FLOOR {
                        stats.below_threshold += 1;
                        continue;
                    }

                    if findings.len() >= target {
                        break;
                    }
                    if seen.contains(&user.username) {
                        stats.duplicates_skipped += 1;
                        continue;
                    }

                    seen.insert(user.username.clone());
                    findings.push(attendee_from(tweet, user, relevance));
                }
            }
        }

        stats.unique_collected = findings.len() as u32;

        // Stable sort: equal relevance keeps discovery order
        findings.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        findings.truncate(target);

        info!(%run_id, returned = findings.len(), %stats, "Attendee discovery complete");
        findings
    }

    /// Snapshot the social-search quota for external reporting.
    pub fn usage_stats(&self) -> UsageStats {
        let status = self.limiter.endpoint_status(Endpoint::TweetSearch);
        UsageStats {
            searches_remaining: status.remaining,
            searches_used: status.limit - status.remaining,
            searches_limit: status.limit,
            reset_in_minutes: status.reset_in_minutes,
        }
    }
}

fn attendee_from(tweet: &Tweet, user: &TwitterUser, relevance: f32) -> AttendeeFinding {
    AttendeeFinding {
        handle: format!("@{}", user.username),
        display_name: user.name.clone(),
        bio: user.description.clone().unwrap_or_default(),
        location: user.location.clone().unwrap_or_default(),
        followers_count: user
            .public_metrics
            .as_ref()
            .map(|m| m.followers_count)
            .unwrap_or(0),
        verified: user.verified.unwrap_or(false),
        engagement: classify_engagement(&tweet.text),
        post_excerpt: excerpt(&tweet.text),
        posted_at: tweet.created_at,
        post_url: format!("https://twitter.com/{}/status/{}", user.username, tweet.id),
        relevance_score: relevance,
    }
}

fn excerpt(text: &str) -> String {
    if text.chars().count() > EXCERPT_CHARS {
        let truncated: String = text.chars().take(EXCERPT_CHARS).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}

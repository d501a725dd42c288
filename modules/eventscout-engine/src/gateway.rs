//! Fail-closed gateways between planned queries and the providers.
//!
//! Every fetch consults the rate limiter before touching the network and
//! never propagates an error upward: the orchestrator only ever sees a
//! `FetchOutcome`.

use std::sync::Arc;

use async_trait::async_trait;
use serpapi_client::{RawEventRecord, SerpApiClient};
use tracing::{debug, warn};
use twitter_client::{RecentSearch, TwitterClient};

use crate::rate_limit::{Endpoint, RateLimiter};

/// Outcome of one gated provider call. `Denied` (quota exhausted before the
/// call) and `Failed` (transport or provider error) both yield zero records
/// but stay distinguishable from a genuinely empty `Fetched`, so the
/// orchestrator can abandon a run that cannot make further progress.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    Fetched(T),
    Denied,
    Failed,
}

/// Seam over the event search provider.
#[async_trait]
pub trait EventSearcher: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> anyhow::Result<Vec<RawEventRecord>>;
}

/// Seam over the social search provider.
#[async_trait]
pub trait TweetSearcher: Send + Sync {
    async fn search(&self, query: &str, max_results: u32) -> anyhow::Result<RecentSearch>;
}

#[async_trait]
impl EventSearcher for SerpApiClient {
    async fn search(&self, query: &str, limit: usize) -> anyhow::Result<Vec<RawEventRecord>> {
        Ok(self.search_events(query, limit).await?)
    }
}

#[async_trait]
impl TweetSearcher for TwitterClient {
    async fn search(&self, query: &str, max_results: u32) -> anyhow::Result<RecentSearch> {
        Ok(self.search_recent(query, max_results).await?)
    }
}

/// Ceiling on records requested from one google_events call.
const EVENT_RESULTS_PER_CALL: usize = 10;

/// Ceiling on tweets requested from one recent-search call.
const TWEET_RESULTS_PER_CALL: u32 = 15;

pub struct EventGateway {
    searcher: Arc<dyn EventSearcher>,
    limiter: Arc<RateLimiter>,
}

impl EventGateway {
    pub fn new(searcher: Arc<dyn EventSearcher>, limiter: Arc<RateLimiter>) -> Self {
        Self { searcher, limiter }
    }

    /// Fetch raw event records for one query. The hint is advisory and
    /// clamped to the per-call ceiling.
    pub async fn fetch(&self, query: &str, hint: usize) -> FetchOutcome<Vec<RawEventRecord>> {
        if !self.limiter.try_acquire(Endpoint::EventSearch) {
            debug!(query, "Event search denied by rate limit");
            return FetchOutcome::Denied;
        }

        let limit = hint.max(1).min(EVENT_RESULTS_PER_CALL);
        match self.searcher.search(query, limit).await {
            Ok(records) => FetchOutcome::Fetched(records),
            Err(e) => {
                warn!(query, error = %e, "Event search failed");
                FetchOutcome::Failed
            }
        }
    }
}

pub struct TweetGateway {
    searcher: Arc<dyn TweetSearcher>,
    limiter: Arc<RateLimiter>,
}

impl TweetGateway {
    pub fn new(searcher: Arc<dyn TweetSearcher>, limiter: Arc<RateLimiter>) -> Self {
        Self { searcher, limiter }
    }

    /// Fetch recent posts for one query. The hint is advisory and clamped
    /// to the per-call ceiling.
    pub async fn fetch(&self, query: &str, hint: u32) -> FetchOutcome<RecentSearch> {
        if !self.limiter.try_acquire(Endpoint::TweetSearch) {
            debug!(query, "Tweet search denied by rate limit");
            return FetchOutcome::Denied;
        }

        let max_results = hint.max(1).min(TWEET_RESULTS_PER_CALL);
        match self.searcher.search(query, max_results).await {
            Ok(search) => FetchOutcome::Fetched(search),
            Err(e) => {
                warn!(query, error = %e, "Tweet search failed");
                FetchOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingEventSearcher, ScriptedEventSearcher};

    fn exhaust(limiter: &RateLimiter, endpoint: Endpoint) {
        while limiter.try_acquire(endpoint) {}
    }

    #[tokio::test]
    async fn denied_before_any_provider_call() {
        let limiter = Arc::new(RateLimiter::new());
        exhaust(&limiter, Endpoint::EventSearch);
        let searcher = Arc::new(ScriptedEventSearcher::new(vec![]));
        let gateway = EventGateway::new(searcher.clone(), limiter);

        let outcome = gateway.fetch("events somewhere", 5).await;
        assert!(matches!(outcome, FetchOutcome::Denied));
        assert_eq!(searcher.calls(), 0);
    }

    #[tokio::test]
    async fn provider_error_maps_to_failed() {
        let limiter = Arc::new(RateLimiter::new());
        let gateway = EventGateway::new(Arc::new(FailingEventSearcher), limiter);

        let outcome = gateway.fetch("events somewhere", 5).await;
        assert!(matches!(outcome, FetchOutcome::Failed));
    }

    #[tokio::test]
    async fn hint_is_clamped_to_provider_ceiling() {
        let limiter = Arc::new(RateLimiter::new());
        let searcher = Arc::new(ScriptedEventSearcher::new(vec![Vec::new()]));
        let gateway = EventGateway::new(searcher.clone(), limiter);

        gateway.fetch("events somewhere", 500).await;
        assert_eq!(searcher.last_limit(), Some(EVENT_RESULTS_PER_CALL));
    }
}

//! Per-endpoint call budgets inside fixed time windows.
//!
//! One limiter instance owns every window and is the sole mutator. Callers
//! that need to share quota across runs pass the same `Arc<RateLimiter>`.
//! Windows reset lazily: expiry is checked on each acquisition attempt, not
//! by a timer.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

/// Logical provider endpoints with independent quotas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    EventSearch,
    TweetSearch,
    PostTweet,
    Retweet,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::EventSearch => "event_search",
            Endpoint::TweetSearch => "tweet_search",
            Endpoint::PostTweet => "post_tweet",
            Endpoint::Retweet => "retweet",
        }
    }
}

#[derive(Debug)]
struct Window {
    limit: u32,
    remaining: u32,
    length: Duration,
    reset_at: Option<DateTime<Utc>>,
}

impl Window {
    fn new(limit: u32, length: Duration) -> Self {
        Self {
            limit,
            remaining: limit,
            length,
            reset_at: None,
        }
    }
}

/// Read-only snapshot of one endpoint's window.
#[derive(Debug, Clone, Serialize)]
pub struct WindowStatus {
    pub remaining: u32,
    pub limit: u32,
    pub reset_in_minutes: i64,
    pub window_minutes: i64,
}

/// Tracks the remaining call budget per endpoint. All reads and writes take
/// the one mutex; windows are few and contention is low.
pub struct RateLimiter {
    windows: Mutex<BTreeMap<Endpoint, Window>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        let mut windows = BTreeMap::new();
        windows.insert(Endpoint::EventSearch, Window::new(100, Duration::minutes(60)));
        windows.insert(Endpoint::TweetSearch, Window::new(60, Duration::minutes(15)));
        windows.insert(Endpoint::PostTweet, Window::new(100, Duration::minutes(1440)));
        windows.insert(Endpoint::Retweet, Window::new(5, Duration::minutes(15)));
        Self {
            windows: Mutex::new(windows),
        }
    }

    /// Try to consume one call against the endpoint's window. Returns false
    /// when the window is exhausted; a denied call mutates nothing, and the
    /// caller must treat the query as unexecuted rather than empty.
    pub fn try_acquire(&self, endpoint: Endpoint) -> bool {
        self.try_acquire_at(endpoint, Utc::now())
    }

    /// Clock-injected variant of [`try_acquire`](Self::try_acquire).
    pub fn try_acquire_at(&self, endpoint: Endpoint, now: DateTime<Utc>) -> bool {
        let mut windows = self.windows.lock().expect("limiter lock");
        let Some(window) = windows.get_mut(&endpoint) else {
            return true;
        };

        if window.reset_at.is_none() {
            window.reset_at = Some(now + window.length);
        }
        if let Some(reset_at) = window.reset_at {
            if now > reset_at {
                window.remaining = window.limit;
                window.reset_at = Some(now + window.length);
            }
        }

        if window.remaining > 0 {
            window.remaining -= 1;
            true
        } else {
            debug!(
                endpoint = endpoint.as_str(),
                limit = window.limit,
                "Rate limit exhausted"
            );
            false
        }
    }

    /// Snapshot every endpoint's window.
    pub fn status(&self) -> BTreeMap<Endpoint, WindowStatus> {
        self.status_at(Utc::now())
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> BTreeMap<Endpoint, WindowStatus> {
        let windows = self.windows.lock().expect("limiter lock");
        windows
            .iter()
            .map(|(endpoint, w)| {
                let reset_in = w
                    .reset_at
                    .map(|r| (r - now).num_minutes().max(0))
                    .unwrap_or(0);
                (
                    *endpoint,
                    WindowStatus {
                        remaining: w.remaining,
                        limit: w.limit,
                        reset_in_minutes: reset_in,
                        window_minutes: w.length.num_minutes(),
                    },
                )
            })
            .collect()
    }

    /// Snapshot a single endpoint's window.
    pub fn endpoint_status(&self, endpoint: Endpoint) -> WindowStatus {
        self.status()
            .remove(&endpoint)
            .unwrap_or(WindowStatus {
                remaining: 0,
                limit: 0,
                reset_in_minutes: 0,
                window_minutes: 0,
            })
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

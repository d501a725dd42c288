//! Scripted provider doubles and record builders for tests. No network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;
use serpapi_client::{FlexField, RawEventRecord};
use twitter_client::{PublicMetrics, RecentSearch, Tweet, TwitterUser};

use crate::gateway::{EventSearcher, TweetSearcher};

/// Returns one scripted batch per call, then empty batches. Counts calls so
/// tests can assert how many queries were actually issued.
pub struct ScriptedEventSearcher {
    batches: Mutex<VecDeque<Vec<RawEventRecord>>>,
    calls: AtomicUsize,
    last_limit: Mutex<Option<usize>>,
}

impl ScriptedEventSearcher {
    pub fn new(batches: Vec<Vec<RawEventRecord>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            calls: AtomicUsize::new(0),
            last_limit: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_limit(&self) -> Option<usize> {
        *self.last_limit.lock().expect("lock")
    }
}

#[async_trait]
impl EventSearcher for ScriptedEventSearcher {
    async fn search(&self, _query: &str, limit: usize) -> anyhow::Result<Vec<RawEventRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_limit.lock().expect("lock") = Some(limit);
        Ok(self
            .batches
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_default())
    }
}

/// Always errors, as a transport failure would.
pub struct FailingEventSearcher;

#[async_trait]
impl EventSearcher for FailingEventSearcher {
    async fn search(&self, _query: &str, _limit: usize) -> anyhow::Result<Vec<RawEventRecord>> {
        Err(anyhow!("provider unreachable"))
    }
}

/// Returns one scripted search result per call, then empty results.
pub struct ScriptedTweetSearcher {
    batches: Mutex<VecDeque<RecentSearch>>,
    calls: AtomicUsize,
}

impl ScriptedTweetSearcher {
    pub fn new(batches: Vec<RecentSearch>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TweetSearcher for ScriptedTweetSearcher {
    async fn search(&self, _query: &str, _max_results: u32) -> anyhow::Result<RecentSearch> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .batches
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_default())
    }
}

/// Always errors, as a transport failure would.
pub struct FailingTweetSearcher;

#[async_trait]
impl TweetSearcher for FailingTweetSearcher {
    async fn search(&self, _query: &str, _max_results: u32) -> anyhow::Result<RecentSearch> {
        Err(anyhow!("provider unreachable"))
    }
}

/// Build a raw event record with plain text fields.
pub fn event_record(title: &str, date: &str, address: &str, link: &str) -> RawEventRecord {
    RawEventRecord {
        title: Some(FlexField::Text(title.to_string())),
        date: Some(FlexField::Text(date.to_string())),
        address: Some(FlexField::Text(address.to_string())),
        link: Some(FlexField::Text(link.to_string())),
    }
}

/// Build a tweet authored by `author_id`.
pub fn tweet(id: &str, text: &str, author_id: &str) -> Tweet {
    Tweet {
        id: id.to_string(),
        text: text.to_string(),
        author_id: Some(author_id.to_string()),
        created_at: None,
    }
}

/// Build an expanded author profile.
pub fn user(id: &str, username: &str, name: &str, followers: u64) -> TwitterUser {
    TwitterUser {
        id: id.to_string(),
        username: username.to_string(),
        name: name.to_string(),
        verified: Some(false),
        description: Some(String::new()),
        location: Some(String::new()),
        public_metrics: Some(PublicMetrics {
            followers_count: followers,
            following_count: 0,
            tweet_count: 0,
        }),
    }
}

/// Build a recent-search result from tweets and their authors.
pub fn search_batch(tweets: Vec<Tweet>, users: Vec<TwitterUser>) -> RecentSearch {
    RecentSearch { tweets, users }
}

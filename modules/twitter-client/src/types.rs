use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single tweet from the v2 recent-search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    pub author_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Follower/following counts nested inside a user object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicMetrics {
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub tweet_count: u64,
}

/// An expanded author from the `includes.users` block.
#[derive(Debug, Clone, Deserialize)]
pub struct TwitterUser {
    pub id: String,
    pub username: String,
    pub name: String,
    pub verified: Option<bool>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub users: Vec<TwitterUser>,
}

/// Raw response envelope for the recent-search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchEnvelope {
    #[serde(default)]
    pub data: Vec<Tweet>,
    #[serde(default)]
    pub includes: Includes,
}

/// A recent-search result: matching tweets plus the expanded authors needed
/// to join `Tweet::author_id` to a profile.
#[derive(Debug, Clone, Default)]
pub struct RecentSearch {
    pub tweets: Vec<Tweet>,
    pub users: Vec<TwitterUser>,
}

impl RecentSearch {
    /// Look up an expanded author by tweet author id.
    pub fn user(&self, author_id: &str) -> Option<&TwitterUser> {
        self.users.iter().find(|u| u.id == author_id)
    }
}

/// Body for the create-tweet endpoint.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateTweetRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReplySettings>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ReplySettings {
    pub in_reply_to_tweet_id: String,
}

/// A successfully posted tweet.
#[derive(Debug, Clone, Deserialize)]
pub struct PostedTweet {
    pub id: String,
    pub text: String,
}

/// The authenticated account, from `GET /users/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct Me {
    pub id: String,
    pub username: String,
}

/// Generic `{"data": ...}` wrapper used by the v2 API.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub data: T,
}

pub mod error;
pub mod types;

pub use error::{Result, TwitterError};
pub use types::{Includes, Me, PostedTweet, PublicMetrics, RecentSearch, Tweet, TwitterUser};

use std::time::Duration;

use types::{ApiResponse, CreateTweetRequest, ReplySettings, SearchEnvelope};

const BASE_URL: &str = "https://api.twitter.com/2";

/// The recent-search endpoint accepts 10..=100 results per call.
const MIN_SEARCH_RESULTS: u32 = 10;
const MAX_SEARCH_RESULTS: u32 = 100;

/// Timeout for a single API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct TwitterClient {
    client: reqwest::Client,
    bearer_token: String,
}

impl TwitterClient {
    pub fn new(bearer_token: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("http client");
        Self {
            client,
            bearer_token,
        }
    }

    /// Search tweets from the last 7 days. Requests the author expansion so
    /// results can be joined to user profiles.
    pub async fn search_recent(&self, query: &str, max_results: u32) -> Result<RecentSearch> {
        let max_results = max_results.clamp(MIN_SEARCH_RESULTS, MAX_SEARCH_RESULTS);
        let url = format!("{BASE_URL}/tweets/search/recent");
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(&[
                ("query", query),
                ("max_results", &max_results.to_string()),
                ("tweet.fields", "author_id,created_at,text"),
                (
                    "user.fields",
                    "username,name,verified,description,location,public_metrics",
                ),
                ("expansions", "author_id"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TwitterError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let envelope: SearchEnvelope = resp.json().await?;
        tracing::debug!(query, count = envelope.data.len(), "Fetched tweets");
        Ok(RecentSearch {
            tweets: envelope.data,
            users: envelope.includes.users,
        })
    }

    /// Post a tweet, optionally as a reply to an existing tweet.
    pub async fn create_tweet(
        &self,
        text: &str,
        in_reply_to: Option<&str>,
    ) -> Result<PostedTweet> {
        let body = CreateTweetRequest {
            text: text.to_string(),
            reply: in_reply_to.map(|id| ReplySettings {
                in_reply_to_tweet_id: id.to_string(),
            }),
        };

        let url = format!("{BASE_URL}/tweets");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.bearer_token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TwitterError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let posted: ApiResponse<PostedTweet> = resp.json().await?;
        tracing::info!(tweet_id = %posted.data.id, reply = in_reply_to.is_some(), "Tweet posted");
        Ok(posted.data)
    }

    /// The authenticated account.
    pub async fn me(&self) -> Result<Me> {
        let url = format!("{BASE_URL}/users/me");
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TwitterError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let me: ApiResponse<Me> = resp.json().await?;
        Ok(me.data)
    }

    /// Retweet on behalf of the authenticated account.
    pub async fn retweet(&self, tweet_id: &str) -> Result<()> {
        let me = self.me().await?;
        let url = format!("{BASE_URL}/users/{}/retweets", me.id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.bearer_token)
            .json(&serde_json::json!({ "tweet_id": tweet_id }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TwitterError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        tracing::info!(tweet_id, "Retweeted");
        Ok(())
    }

    /// Like a tweet on behalf of the authenticated account.
    pub async fn like(&self, tweet_id: &str) -> Result<()> {
        let me = self.me().await?;
        let url = format!("{BASE_URL}/users/{}/likes", me.id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.bearer_token)
            .json(&serde_json::json!({ "tweet_id": tweet_id }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TwitterError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        tracing::info!(tweet_id, "Liked");
        Ok(())
    }
}

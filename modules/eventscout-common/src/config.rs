use std::env;

use tracing::info;

/// Application configuration loaded from environment variables.
///
/// Provider credentials are optional on purpose: an engine built without a
/// provider answers every discovery request with an empty result instead of
/// failing, so a partially configured deployment still runs.
#[derive(Debug, Clone)]
pub struct Config {
    /// SerpAPI key for the google_events search engine.
    pub serpapi_api_key: Option<String>,
    /// Bearer token for the X/Twitter v2 API.
    pub twitter_bearer_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            serpapi_api_key: optional_env("SERPAPI_API_KEY"),
            twitter_bearer_token: optional_env("TWITTER_BEARER_TOKEN"),
        }
    }

    /// Log which credentials are present without leaking their values.
    pub fn log_redacted(&self) {
        info!(
            serpapi = self.serpapi_api_key.is_some(),
            twitter = self.twitter_bearer_token.is_some(),
            "Credentials loaded"
        );
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

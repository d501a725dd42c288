use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use eventscout_common::{
    AttendeeCriteria, AttendeeFinding, Config, EventCategory, EventCriteria, EventFinding,
};
use eventscout_engine::attendees::AttendeeEngine;
use eventscout_engine::dates::parse_user_date;
use eventscout_engine::events::EventEngine;
use eventscout_engine::gateway::{EventSearcher, TweetSearcher};
use eventscout_engine::rate_limit::RateLimiter;
use serpapi_client::SerpApiClient;
use twitter_client::TwitterClient;

#[derive(Parser)]
#[command(name = "eventscout", about = "Discover events and their likely attendees")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Discover events in a location within a date range
    Events {
        location: String,
        /// Inclusive range start, e.g. "2026-11-01" or "November 1, 2026"
        start: String,
        /// Inclusive range end
        end: String,
        /// Restrict and boost these categories (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,
        /// Exact number of events to return
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
    /// Discover trending events in a location, no date filter
    Trending {
        location: String,
        #[arg(long = "category")]
        categories: Vec<String>,
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
    /// Discover likely attendees of a named event
    Attendees {
        event_name: String,
        /// Display date used to sharpen exact-match queries
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
    /// Show per-endpoint rate limit windows
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("eventscout_engine=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_redacted();

    let limiter = Arc::new(RateLimiter::new());

    match cli.command {
        Command::Events {
            location,
            start,
            end,
            categories,
            count,
        } => {
            let now = Utc::now();
            let Some(start_date) = parse_user_date(&start, now) else {
                bail!("unrecognized start date: {start}");
            };
            let Some(end_date) = parse_user_date(&end, now) else {
                bail!("unrecognized end date: {end}");
            };
            let criteria = EventCriteria::builder()
                .location(location)
                .start(start_date)
                .end(end_date)
                .categories(parse_categories(&categories)?)
                .build();

            let engine = event_engine(&config, limiter);
            let findings = engine.discover(&criteria, count).await;
            print_events(&findings);
        }
        Command::Trending {
            location,
            categories,
            count,
        } => {
            let categories = parse_categories(&categories)?;
            let engine = event_engine(&config, limiter);
            let findings = engine.discover_trending(&location, &categories, count).await;
            print_events(&findings);
        }
        Command::Attendees {
            event_name,
            date,
            count,
        } => {
            let criteria = match date {
                Some(date) => AttendeeCriteria::builder()
                    .event_name(event_name)
                    .event_date(date)
                    .build(),
                None => AttendeeCriteria::builder().event_name(event_name).build(),
            };

            let engine = attendee_engine(&config, limiter);
            let findings = engine.discover(&criteria, count).await;
            print_attendees(&findings);

            let usage = engine.usage_stats();
            println!(
                "searches: {} used, {} remaining of {} (reset in {} min)",
                usage.searches_used,
                usage.searches_remaining,
                usage.searches_limit,
                usage.reset_in_minutes,
            );
        }
        Command::Status => {
            println!("{}", serde_json::to_string_pretty(&limiter.status())?);
        }
    }

    Ok(())
}

fn event_engine(config: &Config, limiter: Arc<RateLimiter>) -> EventEngine {
    let searcher = config
        .serpapi_api_key
        .clone()
        .map(|key| Arc::new(SerpApiClient::new(key)) as Arc<dyn EventSearcher>);
    EventEngine::new(searcher, limiter)
}

fn attendee_engine(config: &Config, limiter: Arc<RateLimiter>) -> AttendeeEngine {
    let searcher = config
        .twitter_bearer_token
        .clone()
        .map(|token| Arc::new(TwitterClient::new(token)) as Arc<dyn TweetSearcher>);
    AttendeeEngine::new(searcher, limiter)
}

fn parse_categories(raw: &[String]) -> Result<Vec<EventCategory>> {
    raw.iter()
        .map(|c| c.parse::<EventCategory>().map_err(|e| anyhow::anyhow!(e)))
        .collect()
}

fn print_events(findings: &[EventFinding]) {
    if findings.is_empty() {
        println!("No events found.");
        return;
    }
    for (i, f) in findings.iter().enumerate() {
        println!(
            "{:>2}. {}  [{}]  {} | {} | hype {:.2}",
            i + 1,
            f.name,
            f.category,
            f.date_display,
            f.venue,
            f.hype_score,
        );
        if !f.source_url.is_empty() {
            println!("      {}", f.source_url);
        }
    }
}

fn print_attendees(findings: &[AttendeeFinding]) {
    if findings.is_empty() {
        println!("No attendees found.");
        return;
    }
    for (i, f) in findings.iter().enumerate() {
        println!(
            "{:>2}. {} ({}) | {} followers | {} | relevance {:.2}",
            i + 1,
            f.handle,
            f.display_name,
            f.followers_count,
            f.engagement.as_str(),
            f.relevance_score,
        );
        println!("      \"{}\"  {}", f.post_excerpt, f.post_url);
    }
}

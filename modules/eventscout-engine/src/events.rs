//! Event discovery orchestration: plan → gate → pipeline → score → rank.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use eventscout_common::{EventCategory, EventCriteria, EventFinding};
use tracing::{info, warn};
use uuid::Uuid;

use crate::dedup::event_key;
use crate::gateway::{EventGateway, EventSearcher, FetchOutcome};
use crate::normalize::event_from_record;
use crate::planner::{self, QueryPlan};
use crate::rate_limit::RateLimiter;
use crate::scoring::hype_score;

/// Unique events collected per requested one before ranking, so truncation
/// picks from a deeper pool.
const COLLECT_MULTIPLIER: usize = 2;

/// The trending path casts a wider net; its queries are broader and cheaper
/// to satisfy.
const TRENDING_COLLECT_MULTIPLIER: usize = 5;

/// Stats from one event discovery run.
#[derive(Debug, Default)]
pub struct EventDiscoveryStats {
    pub queries_issued: u32,
    pub records_seen: u32,
    pub invalid_dropped: u32,
    pub out_of_range: u32,
    pub duplicates_skipped: u32,
    pub unique_collected: u32,
    pub quota_denied: bool,
}

impl fmt::Display for EventDiscoveryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "queries={}, records={}, invalid={}, out_of_range={}, dupes={}, unique={}{}",
            self.queries_issued,
            self.records_seen,
            self.invalid_dropped,
            self.out_of_range,
            self.duplicates_skipped,
            self.unique_collected,
            if self.quota_denied { ", quota_denied" } else { "" },
        )
    }
}

/// Discovers unique, hype-ranked events through a rate-limited search
/// provider. Built without a searcher it answers every request with an
/// empty result.
pub struct EventEngine {
    gateway: Option<EventGateway>,
}

impl EventEngine {
    pub fn new(searcher: Option<Arc<dyn EventSearcher>>, limiter: Arc<RateLimiter>) -> Self {
        if searcher.is_none() {
            warn!("Event search provider not configured; event discovery will return nothing");
        }
        Self {
            gateway: searcher.map(|s| EventGateway::new(s, limiter)),
        }
    }

    /// Discover up to `target` unique events inside the criteria's date
    /// range, ranked by hype score descending. Returns fewer than `target`
    /// when the provider yields nothing more; never fabricates.
    pub async fn discover(&self, criteria: &EventCriteria, target: usize) -> Vec<EventFinding> {
        let Some(gateway) = &self.gateway else {
            return Vec::new();
        };

        let run_id = Uuid::new_v4();
        info!(
            %run_id,
            location = criteria.location.as_str(),
            start = %criteria.start,
            end = %criteria.end,
            target,
            "Discovering events"
        );

        let plan = planner::plan_event_queries(criteria);
        let cap = target * COLLECT_MULTIPLIER;
        let (mut findings, stats) = collect(gateway, &plan, cap, Some((criteria.start, criteria.end))).await;

        rank(&mut findings);
        findings.truncate(target);

        info!(%run_id, returned = findings.len(), %stats, "Event discovery complete");
        findings
    }

    /// Discover up to `target` trending events with no date filter, ranked
    /// by hype score descending. Records with unparseable dates still
    /// participate here; only their dedup key uses the date text.
    pub async fn discover_trending(
        &self,
        location: &str,
        categories: &[EventCategory],
        target: usize,
    ) -> Vec<EventFinding> {
        let Some(gateway) = &self.gateway else {
            return Vec::new();
        };

        let run_id = Uuid::new_v4();
        info!(%run_id, location, target, "Discovering trending events");

        let plan = planner::plan_trending_queries(location, categories, Utc::now().year());
        let cap = target * TRENDING_COLLECT_MULTIPLIER;
        let (mut findings, stats) = collect(gateway, &plan, cap, None).await;

        rank(&mut findings);
        findings.truncate(target);

        info!(%run_id, returned = findings.len(), %stats, "Trending discovery complete");
        findings
    }
}

/// Drive the plan through the gateway and record pipeline until the
/// collection cap is reached, the plan is exhausted, or the quota runs out.
async fn collect(
    gateway: &EventGateway,
    plan: &QueryPlan,
    cap: usize,
    range: Option<(NaiveDate, NaiveDate)>,
) -> (Vec<EventFinding>, EventDiscoveryStats) {
    let mut stats = EventDiscoveryStats::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut findings: Vec<EventFinding> = Vec::new();
    let now = Utc::now();

    'phases: for phase in &plan.phases {
        for query in phase.queries.iter().take(phase.max_queries) {
            if findings.len() >= cap {
                break 'phases;
            }

            let hint = (cap - findings.len()).max(1) * phase.result_multiplier;
            stats.queries_issued += 1;

            let records = match gateway.fetch(&query.text, hint).await {
                FetchOutcome::Fetched(records) => records,
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

            for record in &records {
                stats.records_seen += 1;

                let Some(finding) = event_from_record(record, now) else {
                    stats.invalid_dropped += 1;
                    continue;
                };

                if let Some((start, end)) = range {
                    match finding.starts_at.map(|t| t.date_naive()) {
                        Some(date) if date >= start && date <= end => {}
                        _ => {
                            stats.out_of_range += 1;
                            continue;
                        }
                    }
                }

                if !seen.insert(event_key(&finding.name, &finding.date_display)) {
                    stats.duplicates_skipped += 1;
                    continue;
                }

                findings.push(finding);
            }
        }
    }

    stats.unique_collected = findings.len() as u32;
    (findings, stats)
}

/// Score every finding and order by hype descending. The sort is stable, so
/// equal scores keep discovery order.
fn rank(findings: &mut [EventFinding]) {
    for finding in findings.iter_mut() {
        finding.hype_score = hype_score(&finding.name, &finding.venue, finding.category);
    }
    findings.sort_by(|a, b| b.hype_score.total_cmp(&a.hype_score));
}

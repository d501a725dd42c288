//! Deduplication keys: the pipeline's last stage.

use std::sync::LazyLock;

use regex::Regex;

static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Deterministic identity for an event: normalized name plus the first
/// whitespace token of the display date ("nodate" when absent). Two items
/// with equal keys are the same event; the first seen wins. The coarse date
/// token can conflate same-named events whose dates share a leading token;
/// kept as-is until that proves to merge incorrectly in practice.
pub(crate) fn event_key(name: &str, date_display: &str) -> String {
    let lowercased = name.to_lowercase();
    let normalized = NON_WORD_RE.replace_all(&lowercased, "");
    let normalized = WHITESPACE_RE.replace_all(&normalized, " ");
    let normalized = normalized.trim();
    let date_part = date_display.split_whitespace().next().unwrap_or("nodate");
    format!("{normalized}_{date_part}")
}

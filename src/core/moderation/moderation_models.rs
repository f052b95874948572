// Moderation domain models - data structures for the decision pipeline.
//
// These are pure domain types with no HTTP or storage dependencies.
// The http layer converts these to wire responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Media type of submitted content.
///
/// Only text gets the full pipeline; image and audio content is limited
/// to the keyword scan until richer analyzers exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Text,
    Image,
    Audio,
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Text => write!(f, "text"),
            MediaType::Image => write!(f, "image"),
            MediaType::Audio => write!(f, "audio"),
        }
    }
}

/// Final decision produced by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
    /// Whether the content may be published.
    pub approved: bool,
    /// Confidence in the decision, always within [0, 1].
    pub confidence: f64,
    /// Violation categories. Empty only for a clean approval.
    pub categories: Vec<String>,
    /// User-facing remediation hints for rejected content.
    pub suggestions: Vec<String>,
}

impl ModerationResult {
    /// Result before any stage has fired.
    pub fn baseline() -> Self {
        Self {
            approved: true,
            confidence: 0.95,
            categories: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Named fail-open fallback: the moderation subsystem itself failed,
    /// so content passes by default. Callers pair this with a
    /// failure-class status so clients can tell it apart from a real
    /// approval.
    pub fn fail_open() -> Self {
        Self {
            approved: true,
            confidence: 0.5,
            categories: vec!["error".to_string()],
            suggestions: Vec::new(),
        }
    }
}

/// Rejecting partial verdict produced by a single pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageVerdict {
    pub confidence: f64,
    pub categories: Vec<String>,
    pub suggestions: Vec<String>,
}

/// How verdicts from multiple fired stages combine into one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictMergePolicy {
    /// Each firing stage replaces the running result outright, so the
    /// last stage in pipeline order determines the final categories.
    /// Matches the historical fixtures: a short all-caps message ends up
    /// classified as spam_like only.
    LastWins,
    /// Categories union in stage order; confidence is the minimum across
    /// all fired stages.
    Accumulate,
}

/// Configuration for the decision pipeline.
///
/// Passed to the service constructor; nothing in the pipeline reads the
/// process environment at decision time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    /// Substrings whose presence rejects content outright.
    pub denylist: Vec<String>,
    /// Minimum trimmed length for text content.
    pub min_text_chars: usize,
    /// Text longer than this with no lowercase letters counts as shouting.
    pub shout_min_chars: usize,
    /// A single character repeated this many times counts as spam.
    pub max_char_run: usize,
    /// Persisted log entries keep at most this many characters of content.
    pub log_content_cap: usize,
    /// Timeout for each collaborator call (oracle, log write), single attempt.
    pub collaborator_timeout_secs: u64,
    /// Whether the external oracle stage runs at all.
    pub oracle_enabled: bool,
    /// Merge semantics when more than one stage fires.
    pub merge_policy: VerdictMergePolicy,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            denylist: default_denylist(),
            min_text_chars: 10, // Shorter reports carry no reviewable signal
            shout_min_chars: 20,
            max_char_run: 5,
            log_content_cap: 500, // Width of the moderation_log content column
            collaborator_timeout_secs: 5,
            oracle_enabled: false,
            merge_policy: VerdictMergePolicy::LastWins,
        }
    }
}

/// Built-in denylist: spam and scam markers, harassment, discrimination,
/// violence, hate speech and common insults. Terms are matched as
/// lower-cased substrings, so stems like "discriminat" cover the whole
/// word family.
pub fn default_denylist() -> Vec<String> {
    [
        "spam",
        "fake",
        "scam",
        "fraud",
        "hoax",
        "harass",
        "bully",
        "discriminat",
        "racist",
        "sexist",
        "violence",
        "violent",
        "kill yourself",
        "hate speech",
        "hateful",
        "insult",
        "idiot",
        "stupid",
        "loser",
    ]
    .iter()
    .map(|term| term.to_string())
    .collect()
}

/// One persisted decision record. Written once per invocation, never
/// updated or deleted by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationLogEntry {
    /// Submitted content, truncated to the configured cap.
    pub content: String,
    pub media_type: MediaType,
    pub approved: bool,
    pub confidence: f64,
    pub categories: Vec<String>,
    pub moderated_at: DateTime<Utc>,
}

/// Verdict returned by the external moderation oracle.
///
/// Shaped after the hosted moderations API: one flagged boolean plus
/// per-category flags and scores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OracleVerdict {
    pub flagged: bool,
    #[serde(default)]
    pub categories: HashMap<String, bool>,
    #[serde(default)]
    pub category_scores: HashMap<String, f64>,
}

// Content moderation decision pipeline - core business logic.
//
// The pipeline evaluates submitted content through a fixed sequence of
// rule stages:
// - Keyword scan against the configured denylist (all media types)
// - External moderation oracle (text only, when configured)
// - Minimum-length check (text only)
// - Spam-shape heuristics (text only)
// Every computed decision is written to the moderation log, best effort.
//
// NO HTTP or storage dependencies here - just pure domain logic.

use super::moderation_models::{
    MediaType, ModerationConfig, ModerationLogEntry, ModerationResult, OracleVerdict,
    StageVerdict, VerdictMergePolicy,
};
use async_trait::async_trait;
use chrono::Utc;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

// Fixed remediation suggestions, two per stage.
const KEYWORD_SUGGESTIONS: [&str; 2] = [
    "Remove offensive or inappropriate language",
    "Rephrase your report in neutral terms",
];
const ORACLE_SUGGESTIONS: [&str; 2] = [
    "Revise the sections flagged by content review",
    "Check the community guidelines before resubmitting",
];
const TOO_SHORT_SUGGESTIONS: [&str; 2] = [
    "Add more detail about what happened",
    "Describe the issue in at least a full sentence",
];
const SPAM_LIKE_SUGGESTIONS: [&str; 2] = [
    "Avoid repeated characters and all-caps text",
    "Write your report in normal sentence case",
];

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

/// Boxed error type on the oracle port; transport errors from HTTP
/// clients arrive here unmodified.
pub type OracleError = Box<dyn std::error::Error + Send + Sync>;

// ============================================================================
// PORTS (ORACLE + STORAGE TRAITS)
// ============================================================================

/// External moderation oracle consulted for text content.
#[async_trait]
pub trait ModerationOracle: Send + Sync {
    /// Submit content for an external verdict.
    async fn review(&self, content: &str) -> Result<OracleVerdict, OracleError>;
}

// Blanket implementation for Box<dyn ModerationOracle>.
// This lets the composition root pick a client at runtime while the
// service stays generic.
#[async_trait]
impl ModerationOracle for Box<dyn ModerationOracle> {
    async fn review(&self, content: &str) -> Result<OracleVerdict, OracleError> {
        (**self).review(content).await
    }
}

/// Trait for persisting moderation decisions.
#[async_trait]
pub trait ModerationLogStore: Send + Sync {
    /// Append one decision record.
    async fn record_decision(&self, entry: ModerationLogEntry) -> Result<(), ModerationError>;

    /// Most recent decision records, newest first.
    async fn recent_decisions(&self, limit: u32)
        -> Result<Vec<ModerationLogEntry>, ModerationError>;
}

// Blanket implementation for Box<dyn ModerationLogStore>, mirroring the
// oracle port.
#[async_trait]
impl ModerationLogStore for Box<dyn ModerationLogStore> {
    async fn record_decision(&self, entry: ModerationLogEntry) -> Result<(), ModerationError> {
        (**self).record_decision(entry).await
    }

    async fn recent_decisions(
        &self,
        limit: u32,
    ) -> Result<Vec<ModerationLogEntry>, ModerationError> {
        (**self).recent_decisions(limit).await
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Moderation decision service.
///
/// Stateless across invocations; each decision is computed from the
/// request content, the configuration and (for text) one oracle call.
pub struct ModerationService<S: ModerationLogStore, O: ModerationOracle> {
    store: S,
    oracle: Option<O>,
    config: ModerationConfig,
}

impl<S: ModerationLogStore, O: ModerationOracle> ModerationService<S, O> {
    /// Create a new service. `oracle: None` disables the oracle stage
    /// regardless of configuration.
    pub fn new(store: S, oracle: Option<O>, config: ModerationConfig) -> Self {
        Self {
            store,
            oracle,
            config,
        }
    }

    /// Decide whether `content` may be published.
    ///
    /// Fails with `InvalidInput` for empty content; collaborator errors
    /// never fail the decision. Stage order is fixed, and under the
    /// `LastWins` policy each firing stage replaces the running result,
    /// so source order here is behavior.
    pub async fn decide(
        &self,
        content: &str,
        media_type: MediaType,
    ) -> Result<ModerationResult, ModerationError> {
        if content.is_empty() {
            return Err(ModerationError::InvalidInput(
                "content must not be empty".to_string(),
            ));
        }

        let mut running = RunningVerdict::new(self.config.merge_policy);

        running.apply(self.keyword_verdict(content));

        if media_type == MediaType::Text && self.config.oracle_enabled {
            if let Some(oracle) = &self.oracle {
                match self.bounded(oracle.review(content)).await {
                    Ok(Ok(verdict)) => running.apply(oracle_verdict(&verdict)),
                    Ok(Err(err)) => {
                        tracing::warn!("Moderation oracle call failed, keeping prior verdict: {err}");
                    }
                    Err(_) => {
                        tracing::warn!(
                            "Moderation oracle call timed out after {}s, keeping prior verdict",
                            self.config.collaborator_timeout_secs
                        );
                    }
                }
            }
        }

        if media_type == MediaType::Text {
            running.apply(self.length_verdict(content));
            running.apply(self.spam_shape_verdict(content));
        }

        let result = running.into_result();

        // Best-effort persistence: a failed or slow log write must not
        // fail the decision the caller is waiting on.
        let entry = ModerationLogEntry {
            content: truncate_chars(content, self.config.log_content_cap),
            media_type,
            approved: result.approved,
            confidence: result.confidence,
            categories: result.categories.clone(),
            moderated_at: Utc::now(),
        };
        match self.bounded(self.store.record_decision(entry)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!("Failed to record moderation decision: {err}"),
            Err(_) => tracing::warn!(
                "Moderation log write timed out after {}s",
                self.config.collaborator_timeout_secs
            ),
        }

        Ok(result)
    }

    /// Recent decision log entries, newest first.
    pub async fn recent_decisions(
        &self,
        limit: u32,
    ) -> Result<Vec<ModerationLogEntry>, ModerationError> {
        self.store.recent_decisions(limit).await
    }

    /// Single-attempt timeout wrapper for collaborator calls.
    async fn bounded<F: Future>(&self, fut: F) -> Result<F::Output, tokio::time::error::Elapsed> {
        tokio::time::timeout(
            Duration::from_secs(self.config.collaborator_timeout_secs),
            fut,
        )
        .await
    }

    fn keyword_verdict(&self, content: &str) -> Option<StageVerdict> {
        let lowered = content.to_lowercase();
        self.config
            .denylist
            .iter()
            .any(|term| lowered.contains(term.as_str()))
            .then(|| StageVerdict {
                confidence: 0.9,
                categories: vec!["inappropriate_language".to_string()],
                suggestions: fixed_suggestions(&KEYWORD_SUGGESTIONS),
            })
    }

    fn length_verdict(&self, content: &str) -> Option<StageVerdict> {
        (content.trim().chars().count() < self.config.min_text_chars).then(|| StageVerdict {
            confidence: 0.8,
            categories: vec!["too_short".to_string()],
            suggestions: fixed_suggestions(&TOO_SHORT_SUGGESTIONS),
        })
    }

    fn spam_shape_verdict(&self, content: &str) -> Option<StageVerdict> {
        (self.has_long_char_run(content) || self.is_shouting(content)).then(|| StageVerdict {
            confidence: 0.7,
            categories: vec!["spam_like".to_string()],
            suggestions: fixed_suggestions(&SPAM_LIKE_SUGGESTIONS),
        })
    }

    fn has_long_char_run(&self, content: &str) -> bool {
        let mut run = 0usize;
        let mut prev: Option<char> = None;
        for c in content.chars() {
            if prev == Some(c) {
                run += 1;
            } else {
                run = 1;
                prev = Some(c);
            }
            if run >= self.config.max_char_run {
                return true;
            }
        }
        false
    }

    /// Shouting means long enough to matter and nothing lowercase in it.
    fn is_shouting(&self, content: &str) -> bool {
        content.chars().count() > self.config.shout_min_chars
            && !content.chars().any(|c| c.is_lowercase())
    }
}

/// Convert an oracle response into a stage verdict, if it flagged anything.
///
/// Categories come back as a map, so flagged names are sorted for a
/// deterministic result. Scores from the oracle are clamped into [0, 1].
fn oracle_verdict(verdict: &OracleVerdict) -> Option<StageVerdict> {
    if !verdict.flagged {
        return None;
    }

    let mut categories: Vec<String> = verdict
        .categories
        .iter()
        .filter(|(_, &flagged)| flagged)
        .map(|(name, _)| name.clone())
        .collect();
    categories.sort();

    let confidence = verdict
        .category_scores
        .values()
        .fold(0.0_f64, |max, &score| max.max(score))
        .clamp(0.0, 1.0);

    Some(StageVerdict {
        confidence,
        categories,
        suggestions: fixed_suggestions(&ORACLE_SUGGESTIONS),
    })
}

fn fixed_suggestions(fixed: &[&str; 2]) -> Vec<String> {
    fixed.iter().map(|s| s.to_string()).collect()
}

/// Truncate to at most `cap` characters without splitting a code point.
fn truncate_chars(content: &str, cap: usize) -> String {
    content.chars().take(cap).collect()
}

/// Running pipeline state: the baseline result plus whatever stages fired.
struct RunningVerdict {
    policy: VerdictMergePolicy,
    result: ModerationResult,
    any_fired: bool,
}

impl RunningVerdict {
    fn new(policy: VerdictMergePolicy) -> Self {
        Self {
            policy,
            result: ModerationResult::baseline(),
            any_fired: false,
        }
    }

    fn apply(&mut self, verdict: Option<StageVerdict>) {
        let Some(verdict) = verdict else {
            return;
        };

        match self.policy {
            VerdictMergePolicy::LastWins => {
                self.result = ModerationResult {
                    approved: false,
                    confidence: verdict.confidence,
                    categories: verdict.categories,
                    suggestions: verdict.suggestions,
                };
            }
            VerdictMergePolicy::Accumulate => {
                self.result.confidence = if self.any_fired {
                    self.result.confidence.min(verdict.confidence)
                } else {
                    verdict.confidence
                };
                self.result.approved = false;
                for category in verdict.categories {
                    if !self.result.categories.contains(&category) {
                        self.result.categories.push(category);
                    }
                }
                for suggestion in verdict.suggestions {
                    if !self.result.suggestions.contains(&suggestion) {
                        self.result.suggestions.push(suggestion);
                    }
                }
            }
        }
        self.any_fired = true;
    }

    fn into_result(self) -> ModerationResult {
        self.result
    }
}

// ============================================================================
// TESTS
// ============================================================================

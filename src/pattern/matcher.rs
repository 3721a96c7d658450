//! Pattern Matching
//!
//! Selects the single best stored pattern for a new automation request by
//! combining type compatibility, payload similarity, and context score.
//! Pure and read-only: matching never mutates patterns and may run
//! concurrently over a snapshot of candidates without coordination.

use crate::context::ContextMatcher;
use crate::pattern::types::{AutomationPattern, MatchRequest, Payload};
use crate::pattern::validator::PatternValidator;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Payload keys that identify *which* element a request targets, as
/// opposed to free-form values typed into it. A request to fill the same
/// field with different text should still match; a request naming a
/// different field should not.
const IDENTIFYING_KEYS: [&str; 5] = ["label", "field", "name", "target", "selector"];

/// Weight of identifying-key agreement within payload similarity
const IDENTIFYING_WEIGHT: f64 = 0.7;

/// Composite score weights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Weight of request-type match (always exact after filtering)
    pub type_weight: f64,
    /// Weight of payload similarity
    pub payload_weight: f64,
    /// Weight of context compatibility score
    pub context_weight: f64,
    /// Weight of normalized pattern confidence
    pub confidence_weight: f64,
    /// Confidence value mapping to a normalized score of 1.0
    pub confidence_ceiling: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            type_weight: 0.4,
            payload_weight: 0.3,
            context_weight: 0.2,
            confidence_weight: 0.1,
            confidence_ceiling: 2.0,
        }
    }
}

impl MatchingConfig {
    /// Weights must form a convex combination so composite scores stay
    /// comparable across configurations.
    pub fn validate(&self) -> crate::Result<()> {
        let sum =
            self.type_weight + self.payload_weight + self.context_weight + self.confidence_weight;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(crate::Error::Config(format!(
                "matching weights must sum to 1.0, got {}",
                sum
            )));
        }
        if self.confidence_ceiling <= 0.0 {
            return Err(crate::Error::Config(format!(
                "confidence_ceiling must be > 0, got {}",
                self.confidence_ceiling
            )));
        }
        Ok(())
    }
}

/// A scored candidate, exposed for diagnostics (`pattern-trainer match`)
#[derive(Debug, Clone)]
pub struct ScoredCandidate<'a> {
    pub pattern: &'a AutomationPattern,
    pub score: f64,
}

/// Finds the best stored pattern for a request
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    config: MatchingConfig,
    context_matcher: ContextMatcher,
    validator: PatternValidator,
}

impl PatternMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MatchingConfig) -> Self {
        Self {
            config,
            context_matcher: ContextMatcher::new(),
            validator: PatternValidator::new(),
        }
    }

    /// Select the best match among `candidates`, or `None` when nothing
    /// survives filtering.
    ///
    /// Filtering order: request type, hostname compatibility, structural
    /// validity. Survivors are scored and ties broken by confidence, then
    /// by most recent creation.
    pub fn find_best_match<'a>(
        &self,
        request: &MatchRequest,
        candidates: &'a [AutomationPattern],
    ) -> Option<&'a AutomationPattern> {
        self.score_candidates(request, candidates)
            .into_iter()
            .max_by(|a, b| {
                a.score
                    .partial_cmp(&b.score)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| {
                        a.pattern
                            .confidence
                            .partial_cmp(&b.pattern.confidence)
                            .unwrap_or(Ordering::Equal)
                    })
                    .then_with(|| a.pattern.created_at.cmp(&b.pattern.created_at))
            })
            .map(|scored| scored.pattern)
    }

    /// Filter and score every eligible candidate. Used by matching and by
    /// the CLI's dry-run diagnostics.
    pub fn score_candidates<'a>(
        &self,
        request: &MatchRequest,
        candidates: &'a [AutomationPattern],
    ) -> Vec<ScoredCandidate<'a>> {
        let current_signature = &request.current_context.structural_signature;

        candidates
            .iter()
            .filter(|pattern| pattern.request_type == request.request_type)
            .filter(|pattern| {
                self.context_matcher
                    .is_compatible(&pattern.context, &request.current_context)
            })
            .filter(|pattern| {
                let valid = self.validator.is_still_valid(pattern, current_signature);
                if !valid {
                    tracing::debug!(
                        pattern_id = %pattern.id,
                        learned = %pattern.context.structural_signature,
                        current = %current_signature,
                        "excluding stale pattern"
                    );
                }
                valid
            })
            .map(|pattern| ScoredCandidate {
                score: self.composite_score(request, pattern),
                pattern,
            })
            .collect()
    }

    /// Composite score over an already-filtered candidate
    fn composite_score(&self, request: &MatchRequest, pattern: &AutomationPattern) -> f64 {
        let config = &self.config;
        // Type match is exact by construction after filtering.
        config.type_weight
            + config.payload_weight
                * payload_similarity(&pattern.request_payload, &request.request_payload)
            + config.context_weight
                * self
                    .context_matcher
                    .score(&pattern.context, &request.current_context)
            + config.confidence_weight * self.normalized_confidence(pattern)
    }

    fn normalized_confidence(&self, pattern: &AutomationPattern) -> f64 {
        (pattern.confidence / self.config.confidence_ceiling).clamp(0.0, 1.0)
    }
}

/// Similarity of two payloads in [0, 1].
///
/// Identifying keys (which element) and value keys (what to do with it)
/// are compared as separate groups; agreement on identifying keys carries
/// [`IDENTIFYING_WEIGHT`] of the result. When a group is absent from both
/// payloads its weight shifts to the other group; two empty payloads are
/// identical.
pub fn payload_similarity(learned: &Payload, requested: &Payload) -> f64 {
    let identifying = group_agreement(learned, requested, true);
    let values = group_agreement(learned, requested, false);

    match (identifying, values) {
        (Some(id), Some(val)) => IDENTIFYING_WEIGHT * id + (1.0 - IDENTIFYING_WEIGHT) * val,
        (Some(id), None) => id,
        (None, Some(val)) => val,
        (None, None) => 1.0,
    }
}

/// Agreement ratio over one key group, `None` when neither payload has a
/// key in the group.
fn group_agreement(learned: &Payload, requested: &Payload, identifying: bool) -> Option<f64> {
    let in_group = |key: &str| IDENTIFYING_KEYS.contains(&key) == identifying;

    let keys: std::collections::BTreeSet<&str> = learned
        .keys()
        .chain(requested.keys())
        .map(String::as_str)
        .filter(|k| in_group(k))
        .collect();

    if keys.is_empty() {
        return None;
    }

    let agreeing = keys
        .iter()
        .filter(|key| learned.get(**key).is_some() && learned.get(**key) == requested.get(**key))
        .count();
    Some(agreeing as f64 / keys.len() as f64)
}

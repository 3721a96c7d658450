//! Pattern Validation
//!
//! Classifies a pattern's current reliability and decides staleness
//! against the current page's structural signature. Staleness is binary:
//! a structural change means the captured selector is no longer verifiably
//! attached to the intended semantic element, so no score can save it.

use crate::pattern::types::AutomationPattern;
use serde::{Deserialize, Serialize};

/// Reliability tier of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reliability {
    /// Well-proven and recent: safe for unattended replay
    High,
    /// Some successful history, nothing disqualifying
    Medium,
    /// Unproven (typically never replayed)
    Low,
    /// Aged out or failing too often
    Unreliable,
}

/// Thresholds for reliability classification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Minimum confidence for the High tier
    pub high_confidence: f64,
    /// Minimum usage count for the High tier
    pub high_usage_count: u32,
    /// Minimum success ratio for the High tier
    pub high_success_ratio: f64,
    /// Success ratio below which a used pattern is Unreliable
    pub unreliable_success_ratio: f64,
    /// Patterns older than this many days are Unreliable outright
    pub max_age_days: i64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            high_confidence: 1.2,
            high_usage_count: 5,
            high_success_ratio: 0.8,
            unreliable_success_ratio: 0.5,
            max_age_days: 30,
        }
    }
}

/// Decides staleness and reliability for stored patterns
#[derive(Debug, Clone, Default)]
pub struct PatternValidator {
    config: ValidationConfig,
}

impl PatternValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Whether the pattern's learned page structure is still the one on
    /// screen. Any signature difference invalidates the pattern.
    pub fn is_still_valid(
        &self,
        pattern: &AutomationPattern,
        current_structural_signature: &str,
    ) -> bool {
        pattern.context.structural_signature == current_structural_signature
    }

    /// Classify the pattern's reliability. Tiers are evaluated top-down;
    /// the first matching tier wins, so an aged pattern is Unreliable even
    /// with a perfect success history.
    pub fn reliability_level(&self, pattern: &AutomationPattern) -> Reliability {
        let config = &self.config;
        let age_days = pattern.age_days();
        let ratio = pattern.success_ratio();

        if pattern.confidence >= config.high_confidence
            && pattern.usage_count >= config.high_usage_count
            && ratio >= config.high_success_ratio
            && age_days <= config.max_age_days
        {
            return Reliability::High;
        }

        if age_days > config.max_age_days
            || (pattern.usage_count > 0 && ratio < config.unreliable_success_ratio)
        {
            return Reliability::Unreliable;
        }

        if pattern.usage_count >= 1 {
            Reliability::Medium
        } else {
            Reliability::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PageContext;
    use crate::pattern::types::Payload;
    use chrono::{Duration, Utc};

    fn pattern_with_stats(
        confidence: f64,
        usage_count: u32,
        successful_executions: u32,
        age_days: i64,
    ) -> AutomationPattern {
        let mut pattern = AutomationPattern::new(
            "ClickRequested",
            Payload::new(),
            "#target",
            PageContext::new(
                "https://example.com/",
                "example.com",
                "/",
                "Example",
                "abc123",
            ),
        );
        pattern.confidence = confidence;
        pattern.usage_count = usage_count;
        pattern.successful_executions = successful_executions;
        pattern.created_at = Utc::now() - Duration::days(age_days);
        pattern
    }

    #[test]
    fn test_matching_signature_is_valid() {
        let validator = PatternValidator::new();
        let pattern = pattern_with_stats(1.0, 0, 0, 0);
        assert!(validator.is_still_valid(&pattern, "abc123"));
    }

    #[test]
    fn test_signature_drift_invalidates() {
        let validator = PatternValidator::new();
        let pattern = pattern_with_stats(2.0, 100, 100, 0);
        // A perfect history cannot outvote a structural change.
        assert!(!validator.is_still_valid(&pattern, "def456"));
    }

    #[test]
    fn test_high_reliability() {
        let validator = PatternValidator::new();
        let pattern = pattern_with_stats(1.5, 10, 9, 5);
        assert_eq!(validator.reliability_level(&pattern), Reliability::High);
    }

    #[test]
    fn test_high_requires_all_conditions() {
        let validator = PatternValidator::new();

        // Confidence too low
        let pattern = pattern_with_stats(1.1, 10, 9, 5);
        assert_ne!(validator.reliability_level(&pattern), Reliability::High);

        // Too few uses
        let pattern = pattern_with_stats(1.5, 4, 4, 5);
        assert_ne!(validator.reliability_level(&pattern), Reliability::High);

        // Success ratio too low
        let pattern = pattern_with_stats(1.5, 10, 7, 5);
        assert_ne!(validator.reliability_level(&pattern), Reliability::High);
    }

    #[test]
    fn test_old_pattern_is_unreliable_regardless_of_usage() {
        let validator = PatternValidator::new();
        let pattern = pattern_with_stats(3.0, 100, 100, 31);
        assert_eq!(
            validator.reliability_level(&pattern),
            Reliability::Unreliable
        );
    }

    #[test]
    fn test_low_success_ratio_is_unreliable() {
        let validator = PatternValidator::new();
        let pattern = pattern_with_stats(1.0, 10, 4, 1);
        assert_eq!(
            validator.reliability_level(&pattern),
            Reliability::Unreliable
        );
    }

    #[test]
    fn test_unused_pattern_is_low() {
        let validator = PatternValidator::new();
        let pattern = pattern_with_stats(1.0, 0, 0, 1);
        assert_eq!(validator.reliability_level(&pattern), Reliability::Low);
    }

    #[test]
    fn test_moderately_used_pattern_is_medium() {
        let validator = PatternValidator::new();
        let pattern = pattern_with_stats(1.1, 3, 3, 2);
        assert_eq!(validator.reliability_level(&pattern), Reliability::Medium);
    }

    #[test]
    fn test_exact_boundary_age_is_not_unreliable() {
        let validator = PatternValidator::new();
        // Exactly 30 days old still qualifies for Medium.
        let pattern = pattern_with_stats(1.0, 2, 2, 30);
        assert_eq!(validator.reliability_level(&pattern), Reliability::Medium);
    }

    #[test]
    fn test_success_ratio_exactly_half_is_not_unreliable() {
        let validator = PatternValidator::new();
        let pattern = pattern_with_stats(1.0, 10, 5, 1);
        assert_eq!(validator.reliability_level(&pattern), Reliability::Medium);
    }

    #[test]
    fn test_custom_config_thresholds() {
        let validator = PatternValidator::with_config(ValidationConfig {
            max_age_days: 7,
            ..Default::default()
        });
        let pattern = pattern_with_stats(1.5, 10, 9, 10);
        assert_eq!(
            validator.reliability_level(&pattern),
            Reliability::Unreliable
        );
    }
}

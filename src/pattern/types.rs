//! Pattern Data Structures
//!
//! Defines the persistent pattern entity and the transient request and
//! replay types exchanged with collaborators.

use crate::context::PageContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Key/value map describing an intended action (element label, value, ...)
pub type Payload = BTreeMap<String, String>;

/// Confidence a freshly learned pattern starts with
pub const INITIAL_CONFIDENCE: f64 = 1.0;

/// A learned, reusable mapping from an automation request shape to a
/// concrete element-targeting selector, with accrued usage statistics.
///
/// Immutable except for `confidence`, `usage_count`, and
/// `successful_executions`, which only outcome recording may touch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationPattern {
    /// Unique pattern id
    pub id: Uuid,
    /// Request type tag this pattern answers (e.g. "FillTextRequested")
    pub request_type: String,
    /// The demonstrated request's payload
    pub request_payload: Payload,
    /// Synthesized selector targeting the demonstrated element
    pub selector: String,
    /// Page context at time of learning
    pub context: PageContext,
    /// Starts at 1.0; raised by confirmed successful replays, never
    /// lowered automatically
    pub confidence: f64,
    /// Number of replay attempts
    pub usage_count: u32,
    /// Number of replay attempts reported successful
    pub successful_executions: u32,
    /// When the pattern was learned
    pub created_at: DateTime<Utc>,
}

impl AutomationPattern {
    /// Create a fresh pattern from a confirmed demonstration
    pub fn new(
        request_type: impl Into<String>,
        request_payload: Payload,
        selector: impl Into<String>,
        context: PageContext,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_type: request_type.into(),
            request_payload,
            selector: selector.into(),
            context,
            confidence: INITIAL_CONFIDENCE,
            usage_count: 0,
            successful_executions: 0,
            created_at: Utc::now(),
        }
    }

    /// Fraction of replays that succeeded; 0.0 when never replayed
    pub fn success_ratio(&self) -> f64 {
        if self.usage_count == 0 {
            0.0
        } else {
            f64::from(self.successful_executions) / f64::from(self.usage_count)
        }
    }

    /// Age of the pattern in whole days
    pub fn age_days(&self) -> i64 {
        (Utc::now() - self.created_at).num_days()
    }

    /// Check the pattern's invariants. Patterns loaded from storage that
    /// fail this are skipped with a warning, never matched.
    pub fn validate(&self) -> crate::Result<()> {
        if self.selector.trim().is_empty() {
            return Err(crate::Error::InvalidPattern {
                id: self.id,
                reason: "selector is empty".to_string(),
            });
        }
        if self.successful_executions > self.usage_count {
            return Err(crate::Error::InvalidPattern {
                id: self.id,
                reason: format!(
                    "successful_executions ({}) exceeds usage_count ({})",
                    self.successful_executions, self.usage_count
                ),
            });
        }
        if !self.confidence.is_finite() || self.confidence < 0.0 {
            return Err(crate::Error::InvalidPattern {
                id: self.id,
                reason: format!("confidence {} out of range", self.confidence),
            });
        }
        Ok(())
    }

    /// Build the outbound instruction handed to the replay executor
    pub fn replay_instruction(&self, payload: &Payload) -> ReplayInstruction {
        ReplayInstruction {
            selector: self.selector.clone(),
            request_payload: payload.clone(),
        }
    }
}

impl Default for AutomationPattern {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            request_type: String::new(),
            request_payload: Payload::new(),
            selector: String::new(),
            context: PageContext::default(),
            confidence: INITIAL_CONFIDENCE,
            usage_count: 0,
            successful_executions: 0,
            created_at: Utc::now(),
        }
    }
}

/// A new automation request to be matched against stored patterns.
/// Transient: never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    /// Request type tag
    pub request_type: String,
    /// Intended action payload
    pub request_payload: Payload,
    /// Context of the page the request targets
    pub current_context: PageContext,
}

impl MatchRequest {
    pub fn new(request_type: impl Into<String>, current_context: PageContext) -> Self {
        Self {
            request_type: request_type.into(),
            request_payload: Payload::new(),
            current_context,
        }
    }

    /// Add a payload entry
    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request_payload.insert(key.into(), value.into());
        self
    }
}

/// Outbound contract: what the execution collaborator needs to perform
/// the interaction against a live document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayInstruction {
    /// Selector identifying the target element
    pub selector: String,
    /// Payload of the request being replayed (not the learned one: a
    /// replay fills today's value into yesterday's field)
    pub request_payload: Payload,
}

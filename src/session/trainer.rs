//! Training Session Orchestration
//!
//! Routes automation requests through the pattern matcher or to a fresh
//! demonstration depending on the session mode, and converts confirmed
//! demonstrations into stored patterns.

use crate::element::{ElementDescriptor, SelectorSynthesizer};
use crate::pattern::matcher::PatternMatcher;
use crate::pattern::store::PatternStore;
use crate::pattern::types::{AutomationPattern, MatchRequest, ReplayInstruction};
use crate::session::state::SessionMode;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Fire-and-forget notifications about pattern lifecycle events, consumed
/// by observability collaborators (metrics, UI feedback). Implementations
/// must not block; no acknowledgement is expected.
pub trait PatternObserver: Send + Sync {
    fn pattern_created(&self, _pattern: &AutomationPattern) {}
    fn outcome_recorded(&self, _pattern: &AutomationPattern, _success: bool) {}
}

/// Default observer: emits lifecycle events to the tracing subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PatternObserver for TracingObserver {
    fn pattern_created(&self, pattern: &AutomationPattern) {
        tracing::info!(
            pattern_id = %pattern.id,
            request_type = %pattern.request_type,
            selector = %pattern.selector,
            hostname = %pattern.context.hostname,
            "pattern learned"
        );
    }

    fn outcome_recorded(&self, pattern: &AutomationPattern, success: bool) {
        tracing::info!(
            pattern_id = %pattern.id,
            success,
            usage_count = pattern.usage_count,
            confidence = pattern.confidence,
            "pattern outcome recorded"
        );
    }
}

/// How the session wants an automation request handled
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// Session is inactive: neither learning nor replay happens
    Inactive,
    /// Ask the capture collaborator for a fresh demonstration
    Demonstrate,
    /// A learned pattern matched; hand the instruction to the executor
    Replay {
        instruction: ReplayInstruction,
        pattern_id: Uuid,
    },
}

/// What the UI/capture collaborator reports back after a demonstration
#[derive(Debug, Clone, PartialEq)]
pub enum DemonstrationResult {
    /// The user selected an element
    Confirmed(ElementDescriptor),
    /// The user cancelled; no pattern may be created
    Cancelled,
}

impl DemonstrationResult {
    pub fn confirmed(descriptor: ElementDescriptor) -> Self {
        Self::Confirmed(descriptor)
    }

    pub fn cancelled() -> Self {
        Self::Cancelled
    }
}

/// Result of completing a demonstration
#[derive(Debug, Clone, PartialEq)]
pub enum DemonstrationOutcome {
    /// A new pattern was learned and persisted
    Learned { pattern_id: Uuid, selector: String },
    /// The demonstration was cancelled; the request failed
    Cancelled,
}

impl DemonstrationOutcome {
    pub fn pattern_id(&self) -> Option<Uuid> {
        match self {
            DemonstrationOutcome::Learned { pattern_id, .. } => Some(*pattern_id),
            DemonstrationOutcome::Cancelled => None,
        }
    }
}

/// One training session per controlled surface.
///
/// Holds the mode state machine and wires the selector synthesizer,
/// pattern matcher, and pattern store together. The store is passed in
/// explicitly, never a process-wide singleton, so independent sessions
/// (tests, multiple tabs) cannot cross-contaminate.
pub struct TrainingSession {
    session_id: Uuid,
    mode: SessionMode,
    started_at: DateTime<Utc>,
    hostname: Option<String>,
    store: Arc<dyn PatternStore>,
    matcher: PatternMatcher,
    synthesizer: SelectorSynthesizer,
    observer: Arc<dyn PatternObserver>,
}

impl TrainingSession {
    /// Create an inactive session over the given store
    pub fn new(store: Arc<dyn PatternStore>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            mode: SessionMode::Inactive,
            started_at: Utc::now(),
            hostname: None,
            store,
            matcher: PatternMatcher::new(),
            synthesizer: SelectorSynthesizer::new(),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the default tracing observer
    pub fn with_observer(mut self, observer: Arc<dyn PatternObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Use a custom-configured matcher
    pub fn with_matcher(mut self, matcher: PatternMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    /// Start training for a hostname. Only valid from inactive; an
    /// already-running session keeps its mode.
    pub fn enable(&mut self, hostname: impl Into<String>) {
        let next = self.mode.on_enable();
        if next == self.mode {
            tracing::warn!(mode = %self.mode, "enable ignored: session already running");
            return;
        }
        self.hostname = Some(hostname.into());
        self.started_at = Utc::now();
        self.transition(next, "enable");
    }

    /// Leave training mode and start using learned patterns
    pub fn disable_training(&mut self, reason: &str) {
        let next = self.mode.on_disable_training();
        if next == self.mode {
            tracing::warn!(mode = %self.mode, reason, "disable_training ignored");
            return;
        }
        tracing::info!(reason, "training disabled");
        self.transition(next, "disable_training");
    }

    /// Jump straight to automatic replay from any mode
    pub fn switch_to_automatic(&mut self) {
        let next = self.mode.on_switch_to_automatic();
        self.transition(next, "switch_to_automatic");
    }

    /// End the session. Tears down session state synchronously; patterns
    /// already persisted are not rolled back.
    pub fn stop(&mut self) {
        let next = self.mode.on_stop();
        self.transition(next, "stop");
        self.hostname = None;
    }

    fn transition(&mut self, next: SessionMode, trigger: &str) {
        if next != self.mode {
            tracing::debug!(session_id = %self.session_id, from = %self.mode, to = %next, trigger, "session transition");
            self.mode = next;
        }
    }

    /// Decide how to handle an automation request.
    ///
    /// Matching failures degrade to a demonstration request and are never
    /// surfaced as errors; only a storage failure propagates.
    pub fn handle_request(&self, request: &MatchRequest) -> crate::Result<Disposition> {
        match self.mode {
            SessionMode::Inactive => Ok(Disposition::Inactive),
            SessionMode::Training => Ok(Disposition::Demonstrate),
            SessionMode::Automatic => {
                let candidates = self.store.get_by_type(&request.request_type)?;
                match self.matcher.find_best_match(request, &candidates) {
                    Some(pattern) => {
                        tracing::debug!(
                            pattern_id = %pattern.id,
                            selector = %pattern.selector,
                            "matched pattern for replay"
                        );
                        Ok(Disposition::Replay {
                            instruction: pattern.replay_instruction(&request.request_payload),
                            pattern_id: pattern.id,
                        })
                    }
                    None => {
                        tracing::debug!(
                            request_type = %request.request_type,
                            "no usable pattern; falling back to demonstration"
                        );
                        Ok(Disposition::Demonstrate)
                    }
                }
            }
        }
    }

    /// Convert a finished demonstration into a stored pattern.
    ///
    /// A cancelled demonstration creates nothing and reports failure to
    /// the caller. Confirmed demonstrations synthesize a selector, build
    /// a fresh pattern, persist it, and notify observers. The new pattern
    /// is immediately available for future matches.
    pub fn complete_demonstration(
        &self,
        request: &MatchRequest,
        result: DemonstrationResult,
    ) -> crate::Result<DemonstrationOutcome> {
        if self.mode == SessionMode::Inactive {
            return Err(crate::Error::Session(
                "cannot learn from a demonstration while inactive".to_string(),
            ));
        }

        let descriptor = match result {
            DemonstrationResult::Confirmed(descriptor) => descriptor,
            DemonstrationResult::Cancelled => {
                tracing::debug!(session_id = %self.session_id, "demonstration cancelled");
                return Ok(DemonstrationOutcome::Cancelled);
            }
        };

        let selector = self.synthesizer.synthesize(&descriptor);
        let pattern = AutomationPattern::new(
            request.request_type.clone(),
            request.request_payload.clone(),
            selector.clone(),
            request.current_context.clone(),
        );
        let pattern_id = pattern.id;

        self.store.save(pattern.clone())?;
        self.observer.pattern_created(&pattern);

        Ok(DemonstrationOutcome::Learned {
            pattern_id,
            selector,
        })
    }

    /// Report a replay outcome back to the store and observers
    pub fn record_replay_outcome(
        &self,
        pattern_id: Uuid,
        success: bool,
    ) -> crate::Result<AutomationPattern> {
        let pattern = self.store.record_outcome(pattern_id, success)?;
        self.observer.outcome_recorded(&pattern, success);
        Ok(pattern)
    }
}

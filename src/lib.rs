//! # Pattern Trainer
//!
//! An automation pattern learning and matching engine for web pages.
//!
//! A user demonstrates an action once (clicking a button, filling a field);
//! the engine turns the captured element into a durable, confidence-scored
//! pattern and decides, for later automation requests, whether a learned
//! pattern can be replayed or a fresh demonstration is needed.
//!
//! ## Quick Start
//!
//! ```
//! use pattern_trainer::element::ElementDescriptor;
//! use pattern_trainer::pattern::store::MemoryStore;
//! use pattern_trainer::session::{DemonstrationResult, Disposition, TrainingSession};
//! use pattern_trainer::pattern::types::MatchRequest;
//! use pattern_trainer::context::PageContext;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! let mut session = TrainingSession::new(store);
//! session.enable("example.com");
//!
//! let context = PageContext::new(
//!     "https://example.com/search",
//!     "example.com",
//!     "/search",
//!     "Search",
//!     "sig-1",
//! );
//! let request = MatchRequest::new("FillTextRequested", context)
//!     .with_payload("label", "Search")
//!     .with_payload("value", "rust");
//!
//! // Training mode: every request asks for a demonstration.
//! assert_eq!(session.handle_request(&request).unwrap(), Disposition::Demonstrate);
//!
//! // The user picks an element; a pattern is learned from it.
//! let descriptor = ElementDescriptor::new("input").with_id("search-input");
//! let outcome = session
//!     .complete_demonstration(&request, DemonstrationResult::confirmed(descriptor))
//!     .unwrap();
//! assert!(outcome.pattern_id().is_some());
//!
//! // From now on the same request replays automatically.
//! session.switch_to_automatic();
//! assert!(matches!(session.handle_request(&request).unwrap(), Disposition::Replay { .. }));
//! ```
//!
//! ## Architecture
//!
//! - [`element`]: element descriptors and selector synthesis
//! - [`context`]: page context, structural signatures, context matching
//! - [`pattern`]: the pattern entity, stores, validation, and matching
//! - [`session`]: the training session state machine and orchestration
//! - [`app`]: CLI and configuration management
//!
//! ## Decision Pipeline
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │  Automation  │───▶│   Training   │───▶│   Pattern    │───▶│    Replay    │
//! │   Request    │    │   Session    │    │   Matcher    │    │ Instruction  │
//! └──────────────┘    └──────────────┘    └──────────────┘    └──────────────┘
//!                            │ miss / training mode                  ▲
//!                            ▼                                       │
//!                     ┌──────────────┐    ┌──────────────┐           │
//!                     │Demonstration │───▶│   Selector   │───▶ new pattern
//!                     │   Request    │    │ Synthesizer  │     (stored)
//!                     └──────────────┘    └──────────────┘
//! ```

pub mod element;
pub mod context;
pub mod pattern;
pub mod session;
pub mod app;

// Re-export commonly used types
pub use context::{ContextMatcher, PageContext};
pub use element::{ElementDescriptor, SelectorSynthesizer};
pub use pattern::matcher::PatternMatcher;
pub use pattern::store::{MemoryStore, PatternStore};
pub use pattern::types::{AutomationPattern, MatchRequest, ReplayInstruction};
pub use pattern::validator::{PatternValidator, Reliability};
pub use session::{SessionMode, TrainingSession};

/// Result type alias for the pattern trainer
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the pattern trainer
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No stored pattern matched the request. Informational: the session
    /// falls back to requesting a demonstration, this is never fatal.
    #[error("no matching pattern for request type '{0}'")]
    NoCandidates(String),

    /// A matched candidate failed the staleness check against the current
    /// page signature. Treated identically to no-match.
    #[error("pattern {0} is stale against the current page structure")]
    StaleContext(uuid::Uuid),

    /// The persistence collaborator failed. This is the only error class
    /// surfaced to the caller as a session-level failure.
    #[error("pattern store unavailable: {0}")]
    StorageUnavailable(String),

    /// A stored pattern violates its invariants (empty selector,
    /// successes exceeding usage). Skipped with a warning when loading.
    #[error("invalid pattern {id}: {reason}")]
    InvalidPattern { id: uuid::Uuid, reason: String },

    #[error("session error: {0}")]
    Session(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

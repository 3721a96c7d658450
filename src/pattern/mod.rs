//! Learned automation patterns: entity, storage, validation, matching

pub mod library;
pub mod matcher;
pub mod store;
pub mod types;
pub mod validator;

pub use library::PatternLibrary;
pub use matcher::PatternMatcher;
pub use store::{MemoryStore, PatternStore};
pub use types::{AutomationPattern, MatchRequest, Payload, ReplayInstruction};
pub use validator::{PatternValidator, Reliability};

//! Training session lifecycle and orchestration

pub mod state;
pub mod trainer;

pub use state::SessionMode;
pub use trainer::{
    DemonstrationOutcome, DemonstrationResult, Disposition, PatternObserver, TracingObserver,
    TrainingSession,
};

//! Session Modes
//!
//! The training session's mode is an explicit tagged enumeration with
//! total transition functions. Invalid transitions are no-ops rather than
//! silent inconsistent states: the resulting mode is always well-defined.

use serde::{Deserialize, Serialize};

/// Lifecycle mode of a training session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// No learning and no replay
    #[default]
    Inactive,
    /// Every request forces a fresh demonstration, regardless of
    /// existing patterns
    Training,
    /// Requests first try the pattern matcher; a miss falls back to
    /// demonstration
    Automatic,
}

impl SessionMode {
    /// `enable`: inactive → training. Already-running sessions keep
    /// their mode.
    pub fn on_enable(self) -> SessionMode {
        match self {
            SessionMode::Inactive => SessionMode::Training,
            other => other,
        }
    }

    /// `disable_training`: training → automatic. Never back to inactive:
    /// disabling training means the patterns learned so far should now
    /// be used.
    pub fn on_disable_training(self) -> SessionMode {
        match self {
            SessionMode::Training => SessionMode::Automatic,
            other => other,
        }
    }

    /// `switch_to_automatic`: from any mode → automatic
    pub fn on_switch_to_automatic(self) -> SessionMode {
        SessionMode::Automatic
    }

    /// `stop`: from any mode → inactive, ending any in-flight session
    pub fn on_stop(self) -> SessionMode {
        SessionMode::Inactive
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, SessionMode::Inactive)
    }
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SessionMode::Inactive => "inactive",
            SessionMode::Training => "training",
            SessionMode::Automatic => "automatic",
        };
        f.write_str(label)
    }
}

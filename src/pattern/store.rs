//! Pattern Storage Contract
//!
//! Keyed persistence for learned patterns. The contract is implementation
//! agnostic: any durable keyed store qualifies as long as operations are
//! atomic per id. [`MemoryStore`] is the reference implementation used by
//! sessions and tests; [`crate::pattern::library::PatternLibrary`] adds
//! file-backed persistence on top of it.

use crate::pattern::types::AutomationPattern;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// Fixed confidence increment applied on each confirmed successful replay.
/// Failures leave confidence untouched; demotion happens through the
/// success-ratio reliability tiers instead (see DESIGN.md).
pub const CONFIDENCE_INCREMENT: f64 = 0.1;

/// Storage contract for learned patterns.
///
/// `record_outcome` must be atomic per pattern id: two concurrent outcome
/// reports for the same pattern may never interleave their
/// read-modify-write of the usage statistics.
pub trait PatternStore: Send + Sync {
    /// Persist a pattern (insert or replace by id)
    fn save(&self, pattern: AutomationPattern) -> crate::Result<()>;

    /// Fetch a pattern by id
    fn get(&self, id: Uuid) -> crate::Result<Option<AutomationPattern>>;

    /// All patterns answering a given request type
    fn get_by_type(&self, request_type: &str) -> crate::Result<Vec<AutomationPattern>>;

    /// Snapshot of every stored pattern
    fn get_all(&self) -> crate::Result<Vec<AutomationPattern>>;

    /// Remove a pattern. Deletion is an explicit administrative action;
    /// the core never calls this on its own. Returns whether it existed.
    fn delete(&self, id: Uuid) -> crate::Result<bool>;

    /// Record a replay outcome: `usage_count` always increments,
    /// `successful_executions` and `confidence` only on success. Returns
    /// the updated pattern snapshot.
    fn record_outcome(&self, id: Uuid, success: bool) -> crate::Result<AutomationPattern>;
}

/// In-memory pattern store guarded by a single RwLock.
///
/// Reads share the lock; `record_outcome` takes the write lock for the
/// whole read-modify-write, which serializes concurrent outcome updates
/// per pattern.
#[derive(Debug, Default)]
pub struct MemoryStore {
    patterns: RwLock<HashMap<Uuid, AutomationPattern>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored patterns
    pub fn len(&self) -> usize {
        self.patterns.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.read().is_empty()
    }
}

impl PatternStore for MemoryStore {
    fn save(&self, pattern: AutomationPattern) -> crate::Result<()> {
        pattern.validate()?;
        self.patterns.write().insert(pattern.id, pattern);
        Ok(())
    }

    fn get(&self, id: Uuid) -> crate::Result<Option<AutomationPattern>> {
        Ok(self.patterns.read().get(&id).cloned())
    }

    fn get_by_type(&self, request_type: &str) -> crate::Result<Vec<AutomationPattern>> {
        Ok(self
            .patterns
            .read()
            .values()
            .filter(|p| p.request_type == request_type)
            .cloned()
            .collect())
    }

    fn get_all(&self) -> crate::Result<Vec<AutomationPattern>> {
        Ok(self.patterns.read().values().cloned().collect())
    }

    fn delete(&self, id: Uuid) -> crate::Result<bool> {
        Ok(self.patterns.write().remove(&id).is_some())
    }

    fn record_outcome(&self, id: Uuid, success: bool) -> crate::Result<AutomationPattern> {
        let mut patterns = self.patterns.write();
        let pattern = patterns.get_mut(&id).ok_or_else(|| {
            crate::Error::StorageUnavailable(format!("pattern {} not found", id))
        })?;

        pattern.usage_count += 1;
        if success {
            pattern.successful_executions += 1;
            pattern.confidence += CONFIDENCE_INCREMENT;
        }

        tracing::debug!(
            pattern_id = %id,
            success,
            usage_count = pattern.usage_count,
            confidence = pattern.confidence,
            "recorded replay outcome"
        );
        Ok(pattern.clone())
    }
}

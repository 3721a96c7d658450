//! Pattern Library Files
//!
//! JSON file persistence for a set of learned patterns. This is the
//! reference implementation of the storage contract for the CLI and for
//! single-surface deployments; a remote keyed store can replace it behind
//! [`crate::pattern::store::PatternStore`] without touching the engine.

use crate::pattern::store::{MemoryStore, PatternStore};
use crate::pattern::types::AutomationPattern;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Current library format version
pub const CURRENT_FORMAT_VERSION: &str = "1.0";

/// Get the checkpoint (temporary) path for a library file
fn checkpoint_path(final_path: &Path) -> std::path::PathBuf {
    final_path.with_extension("json.tmp")
}

/// Library metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryMetadata {
    /// Unique library id
    pub id: Uuid,
    /// Hostname this library was collected on, if single-site
    pub hostname: Option<String>,
    /// When the library was created
    pub created_at: DateTime<Utc>,
    /// Last time the library was written
    pub updated_at: DateTime<Utc>,
    /// Version of the library format
    pub format_version: String,
}

impl Default for LibraryMetadata {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            hostname: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            format_version: CURRENT_FORMAT_VERSION.to_string(),
        }
    }
}

/// A persistable collection of learned patterns
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PatternLibrary {
    /// Library metadata
    pub metadata: LibraryMetadata,
    /// The patterns themselves
    pub patterns: Vec<AutomationPattern>,
}

impl PatternLibrary {
    /// Create an empty library, optionally scoped to a hostname
    pub fn new(hostname: Option<String>) -> Self {
        Self {
            metadata: LibraryMetadata {
                hostname,
                ..Default::default()
            },
            patterns: Vec::new(),
        }
    }

    /// Number of patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Find a pattern by id
    pub fn find(&self, id: Uuid) -> Option<&AutomationPattern> {
        self.patterns.iter().find(|p| p.id == id)
    }

    /// Remove a pattern by id; returns whether it existed
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.patterns.len();
        self.patterns.retain(|p| p.id != id);
        self.patterns.len() != before
    }

    /// Save the library to a file (pretty JSON, stamped with update time)
    pub fn save(&mut self, path: &Path) -> crate::Result<()> {
        self.metadata.updated_at = Utc::now();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Save a checkpoint to a temporary file for crash recovery.
    ///
    /// Writes to `<path>.tmp` so that if the process dies mid-session,
    /// learned patterns can be recovered on next launch.
    pub fn save_checkpoint(&self, final_path: &Path) -> crate::Result<()> {
        let tmp_path = checkpoint_path(final_path);
        let json = serde_json::to_string(self)?; // compact JSON for speed
        std::fs::write(&tmp_path, json)?;
        Ok(())
    }

    /// Finalize a checkpoint by renaming `.tmp` to the final path.
    /// Atomic on most filesystems.
    pub fn finalize_checkpoint(final_path: &Path) -> crate::Result<()> {
        let tmp_path = checkpoint_path(final_path);
        if tmp_path.exists() {
            std::fs::rename(&tmp_path, final_path)?;
        }
        Ok(())
    }

    /// Remove a checkpoint file if it exists (e.g. after a clean save)
    pub fn remove_checkpoint(final_path: &Path) {
        let tmp_path = checkpoint_path(final_path);
        let _ = std::fs::remove_file(tmp_path);
    }

    /// Find and recover any orphaned checkpoint files in a directory.
    /// Returns (checkpoint_path, recovered_library) pairs.
    pub fn recover_checkpoints(dir: &Path) -> Vec<(std::path::PathBuf, PatternLibrary)> {
        let mut recovered = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().map(|e| e == "tmp").unwrap_or(false) {
                    if let Ok(content) = std::fs::read_to_string(&path) {
                        if let Ok(library) = serde_json::from_str::<PatternLibrary>(&content) {
                            recovered.push((path, library));
                        }
                    }
                }
            }
        }
        recovered
    }

    /// Load a library from a file.
    ///
    /// Malformed patterns are skipped with a warning and never abort the
    /// load: one corrupt entry must not take the rest of the library with
    /// it. A format-version mismatch is logged but tolerated thanks to
    /// `#[serde(default)]` on every persistent type.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut library: PatternLibrary = serde_json::from_str(&content)?;

        if library.metadata.format_version != CURRENT_FORMAT_VERSION {
            tracing::warn!(
                found = %library.metadata.format_version,
                expected = CURRENT_FORMAT_VERSION,
                "pattern library has different format version; some fields may use defaults"
            );
        }

        library.patterns.retain(|pattern| match pattern.validate() {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(pattern_id = %pattern.id, %error, "skipping invalid pattern");
                false
            }
        });
        Ok(library)
    }

    /// Materialize the library into an in-memory store
    pub fn into_store(self) -> crate::Result<MemoryStore> {
        let store = MemoryStore::new();
        for pattern in self.patterns {
            store.save(pattern)?;
        }
        Ok(store)
    }

    /// Snapshot a store back into a library, preserving this library's
    /// metadata. Patterns are ordered by creation time for stable diffs.
    pub fn from_store(store: &dyn PatternStore, metadata: LibraryMetadata) -> crate::Result<Self> {
        let mut patterns = store.get_all()?;
        patterns.sort_by_key(|p| p.created_at);
        Ok(Self { metadata, patterns })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PageContext;
    use crate::pattern::types::Payload;
    use tempfile::{NamedTempFile, TempDir};

    fn sample_pattern(request_type: &str, selector: &str) -> AutomationPattern {
        AutomationPattern::new(
            request_type,
            Payload::new(),
            selector,
            PageContext::new(
                "https://example.com/",
                "example.com",
                "/",
                "Example",
                "sig",
            ),
        )
    }

    #[test]
    fn test_empty_library() {
        let library = PatternLibrary::new(Some("example.com".to_string()));
        assert!(library.is_empty());
        assert_eq!(library.metadata.hostname.as_deref(), Some("example.com"));
        assert_eq!(library.metadata.format_version, CURRENT_FORMAT_VERSION);
    }

    #[test]
    fn test_save_and_load() {
        let mut library = PatternLibrary::new(None);
        library.patterns.push(sample_pattern("ClickRequested", "#a"));
        library.patterns.push(sample_pattern("FillTextRequested", "#b"));

        let file = NamedTempFile::new().unwrap();
        library.save(file.path()).unwrap();

        let loaded = PatternLibrary::load(file.path()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.metadata.id, library.metadata.id);
    }

    #[test]
    fn test_load_skips_invalid_patterns() {
        let mut library = PatternLibrary::new(None);
        library.patterns.push(sample_pattern("ClickRequested", "#ok"));
        let mut broken = sample_pattern("ClickRequested", "#broken");
        broken.usage_count = 1;
        broken.successful_executions = 5;
        library.patterns.push(broken);

        let file = NamedTempFile::new().unwrap();
        library.save(file.path()).unwrap();

        let loaded = PatternLibrary::load(file.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.patterns[0].selector, "#ok");
    }

    #[test]
    fn test_load_missing_file() {
        let result = PatternLibrary::load(Path::new("/nonexistent/library.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_malformed_json() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{ not json }").unwrap();
        assert!(PatternLibrary::load(file.path()).is_err());
    }

    #[test]
    fn test_find_and_remove() {
        let mut library = PatternLibrary::new(None);
        let pattern = sample_pattern("ClickRequested", "#a");
        let id = pattern.id;
        library.patterns.push(pattern);

        assert!(library.find(id).is_some());
        assert!(library.remove(id));
        assert!(!library.remove(id));
        assert!(library.find(id).is_none());
    }

    #[test]
    fn test_checkpoint_save_and_recover() {
        let dir = TempDir::new().unwrap();
        let final_path = dir.path().join("library.json");

        let mut library = PatternLibrary::new(Some("example.com".to_string()));
        library.patterns.push(sample_pattern("ClickRequested", "#a"));

        library.save_checkpoint(&final_path).unwrap();
        assert!(final_path.with_extension("json.tmp").exists());
        assert!(!final_path.exists());

        let recovered = PatternLibrary::recover_checkpoints(dir.path());
        assert_eq!(recovered.len(), 1);
        assert_eq!(recovered[0].1.len(), 1);
    }

    #[test]
    fn test_finalize_checkpoint_renames() {
        let dir = TempDir::new().unwrap();
        let final_path = dir.path().join("library.json");

        let library = PatternLibrary::new(None);
        library.save_checkpoint(&final_path).unwrap();
        PatternLibrary::finalize_checkpoint(&final_path).unwrap();

        assert!(final_path.exists());
        assert!(!final_path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_remove_checkpoint() {
        let dir = TempDir::new().unwrap();
        let final_path = dir.path().join("library.json");
        let tmp_path = final_path.with_extension("json.tmp");
        std::fs::write(&tmp_path, "{}").unwrap();

        PatternLibrary::remove_checkpoint(&final_path);
        assert!(!tmp_path.exists());
    }

    #[test]
    fn test_recover_ignores_invalid_tmp_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bad.json.tmp"), "not valid json").unwrap();
        assert!(PatternLibrary::recover_checkpoints(dir.path()).is_empty());
    }

    #[test]
    fn test_store_roundtrip() {
        let mut library = PatternLibrary::new(None);
        library.patterns.push(sample_pattern("ClickRequested", "#a"));
        library.patterns.push(sample_pattern("FillTextRequested", "#b"));
        let metadata = library.metadata.clone();

        let store = library.into_store().unwrap();
        assert_eq!(store.len(), 2);

        let rebuilt = PatternLibrary::from_store(&store, metadata.clone()).unwrap();
        assert_eq!(rebuilt.len(), 2);
        assert_eq!(rebuilt.metadata.id, metadata.id);
    }

    #[test]
    fn test_version_mismatch_still_loads() {
        let mut library = PatternLibrary::new(None);
        library.metadata.format_version = "2.0".to_string();
        library.patterns.push(sample_pattern("ClickRequested", "#a"));

        let file = NamedTempFile::new().unwrap();
        library.save(file.path()).unwrap();

        let loaded = PatternLibrary::load(file.path()).unwrap();
        assert_eq!(loaded.metadata.format_version, "2.0");
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_backward_compat_metadata_missing_fields() {
        // Simulate an early library file that lacked hostname scoping.
        let json = r#"{
            "metadata": {
                "id": "00000000-0000-0000-0000-000000000001",
                "created_at": "2025-01-01T00:00:00Z",
                "updated_at": "2025-01-01T00:00:00Z"
            },
            "patterns": []
        }"#;
        let library: PatternLibrary = serde_json::from_str(json).unwrap();
        assert!(library.metadata.hostname.is_none());
        assert_eq!(library.metadata.format_version, CURRENT_FORMAT_VERSION);
    }
}

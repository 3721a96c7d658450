//! Page Context
//!
//! The site/page identity a pattern was learned under: hostname, path,
//! title, and a coarse structural signature used to detect layout drift.
//! Immutable once attached to a pattern or a request.

use crate::element::ElementDescriptor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// How many interactive elements contribute to a structural signature.
/// Enough to notice layout changes, few enough to ignore content churn
/// below the fold.
pub const SIGNATURE_ELEMENT_COUNT: usize = 20;

/// Snapshot of the page a capture or request happened on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageContext {
    /// Full URL at capture time
    pub url: String,
    /// Hostname (patterns are scoped to this)
    pub hostname: String,
    /// Path component of the URL
    pub pathname: String,
    /// Document title
    pub title: String,
    /// Coarse hash of the first N interactive elements' tag/id/class
    pub structural_signature: String,
    /// When this context was captured
    pub captured_at: DateTime<Utc>,
}

impl PageContext {
    pub fn new(
        url: impl Into<String>,
        hostname: impl Into<String>,
        pathname: impl Into<String>,
        title: impl Into<String>,
        structural_signature: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            hostname: hostname.into(),
            pathname: pathname.into(),
            title: title.into(),
            structural_signature: structural_signature.into(),
            captured_at: Utc::now(),
        }
    }

    /// Path split into non-empty segments
    pub fn path_segments(&self) -> Vec<&str> {
        self.pathname.split('/').filter(|s| !s.is_empty()).collect()
    }
}

impl Default for PageContext {
    fn default() -> Self {
        Self {
            url: String::new(),
            hostname: String::new(),
            pathname: String::new(),
            title: String::new(),
            structural_signature: String::new(),
            captured_at: Utc::now(),
        }
    }
}

/// Compute a structural signature over the page's interactive elements.
///
/// Only the first [`SIGNATURE_ELEMENT_COUNT`] elements contribute, and only
/// their tag name, id, and first class token. The result is a hex-encoded
/// 64-bit hash: cheap to compare, stable for an unchanged layout, and
/// different whenever an element is added, removed, or reordered near the
/// top of the page.
pub fn structural_signature(elements: &[ElementDescriptor]) -> String {
    let mut hasher = DefaultHasher::new();
    for element in elements.iter().take(SIGNATURE_ELEMENT_COUNT) {
        element.tag_name.hash(&mut hasher);
        element.id.hash(&mut hasher);
        element.first_class().hash(&mut hasher);
    }
    format!("{:016x}", hasher.finish())
}

//! Element Descriptors
//!
//! An [`ElementDescriptor`] is the immutable snapshot of a DOM-like node
//! handed to the engine by the capture collaborator when the user selects
//! an element during a demonstration. It is supplied once per capture
//! event and never mutated by the core.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifying attributes of a captured DOM-like node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ElementDescriptor {
    /// Tag name (lowercased by convention, e.g. "input", "button")
    pub tag_name: String,
    /// The `id` attribute, if present
    pub id: Option<String>,
    /// Class list in document order
    pub classes: Vec<String>,
    /// Remaining attributes (name, data-testid, aria-label, ...)
    pub attributes: BTreeMap<String, String>,
}

impl ElementDescriptor {
    /// Create a descriptor with just a tag name
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Set the `id` attribute
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Append a class token
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set an arbitrary attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Look up an attribute value
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// First class token, if any non-empty one exists
    pub fn first_class(&self) -> Option<&str> {
        self.classes
            .iter()
            .map(String::as_str)
            .find(|c| !c.trim().is_empty())
    }
}

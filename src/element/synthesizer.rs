//! Selector Synthesis
//!
//! Turns an [`ElementDescriptor`] into a single best identifying selector
//! string. Strategies are tried in a fixed priority order: test ids and
//! element ids survive redeploys far better than styling classes, so they
//! win whenever present.

use crate::element::descriptor::ElementDescriptor;

/// Selector strategy, in priority order (lower = tried first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorStrategy {
    /// `[data-testid="…"]` - stable test attribute (highest stability)
    TestId,
    /// `#id` - element id attribute
    Id,
    /// `[name="…"]` - form control name
    Name,
    /// `.class` - first class token
    Class,
    /// Bare tag name (always available fallback)
    TagName,
}

impl SelectorStrategy {
    /// All strategies in evaluation order
    pub const ORDERED: [SelectorStrategy; 5] = [
        SelectorStrategy::TestId,
        SelectorStrategy::Id,
        SelectorStrategy::Name,
        SelectorStrategy::Class,
        SelectorStrategy::TagName,
    ];

    /// Attempt to build a selector from the descriptor with this strategy
    fn build(&self, descriptor: &ElementDescriptor) -> Option<String> {
        match self {
            SelectorStrategy::TestId => descriptor
                .attribute("data-testid")
                .filter(|v| !v.trim().is_empty())
                .map(|v| format!("[data-testid=\"{}\"]", escape_attr(v))),
            SelectorStrategy::Id => descriptor
                .id
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| format!("#{}", v)),
            SelectorStrategy::Name => descriptor
                .attribute("name")
                .filter(|v| !v.trim().is_empty())
                .map(|v| format!("[name=\"{}\"]", escape_attr(v))),
            SelectorStrategy::Class => descriptor.first_class().map(|c| format!(".{}", c)),
            SelectorStrategy::TagName => {
                let tag = descriptor.tag_name.trim();
                if tag.is_empty() {
                    None
                } else {
                    Some(tag.to_string())
                }
            }
        }
    }
}

/// Escape quotes and backslashes for use inside an attribute selector
fn escape_attr(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Synthesizes a single best selector from an element descriptor
#[derive(Debug, Clone, Default)]
pub struct SelectorSynthesizer;

impl SelectorSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Produce the best identifying selector for the descriptor.
    ///
    /// Total function: falls back to the bare tag name, and to `"*"` if
    /// even the tag name is missing, so learning never fails on a sparse
    /// capture.
    pub fn synthesize(&self, descriptor: &ElementDescriptor) -> String {
        SelectorStrategy::ORDERED
            .iter()
            .find_map(|strategy| strategy.build(descriptor))
            .unwrap_or_else(|| "*".to_string())
    }

    /// The strategy that would win for this descriptor
    pub fn winning_strategy(&self, descriptor: &ElementDescriptor) -> SelectorStrategy {
        SelectorStrategy::ORDERED
            .iter()
            .copied()
            .find(|strategy| strategy.build(descriptor).is_some())
            .unwrap_or(SelectorStrategy::TagName)
    }
}

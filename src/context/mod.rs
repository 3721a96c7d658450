//! Page context capture and compatibility scoring

pub mod matcher;
pub mod page;

pub use matcher::ContextMatcher;
pub use page::{structural_signature, PageContext};

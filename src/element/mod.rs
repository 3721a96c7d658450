//! Element descriptors and selector synthesis

pub mod descriptor;
pub mod synthesizer;

pub use descriptor::ElementDescriptor;
pub use synthesizer::SelectorSynthesizer;

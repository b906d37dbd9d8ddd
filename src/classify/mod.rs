//! Classification module
//!
//! Provides the builder and the multi-class classifier that tie the
//! codebook and per-class models together.

mod builder;
mod classifier;

pub use builder::ClassifierBuilder;
pub use classifier::RhythmClassifier;

//! Vector quantization module
//!
//! Provides the shared k-means codebook and batch symbol encoding that
//! reduce waveforms to a discrete alphabet.

mod codebook;
mod encoder;

pub use codebook::Codebook;
pub use encoder::{encode, trim_to_length, trim_to_shared_length};

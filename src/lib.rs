//! ECG rhythm classification with vector-quantized hidden Markov models
//!
//! Variable-length cardiac waveforms are reduced to a shared discrete
//! alphabet by a k-means codebook, one discrete-output HMM is trained per
//! rhythm class, and unseen waveform collections are classified by maximum
//! log-likelihood across the class models.

pub mod classify;
pub mod data;
pub mod error;
pub mod models;
pub mod quantize;

pub use classify::{ClassifierBuilder, RhythmClassifier};
pub use error::{ClassifierError, Result};

//! HMM models module
//!
//! Provides the discrete-output HMM used per rhythm class, with scaled
//! Forward-Backward and Baum-Welch algorithms.

mod hmm;
mod algorithms;

pub use hmm::ClassModel;
pub use algorithms::{forward, forward_backward};

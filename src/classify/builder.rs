//! Builder for the rhythm classifier

use super::classifier::RhythmClassifier;
use crate::data::Waveform;
use crate::error::{ClassifierError, Result};
use std::collections::BTreeMap;

const DEFAULT_SEED: u64 = 42;
const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Accumulates labeled waveforms and model configuration, then builds a
/// validated classifier
///
/// Model parameters have no defaults; `build` fails until both the state
/// and symbol counts are set to non-zero values.
#[derive(Debug, Clone)]
pub struct ClassifierBuilder {
    training: BTreeMap<u32, Vec<Waveform>>,
    n_states: usize,
    n_symbols: usize,
    seed: u64,
    max_iterations: usize,
}

impl Default for ClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierBuilder {
    pub fn new() -> Self {
        Self {
            training: BTreeMap::new(),
            n_states: 0,
            n_symbols: 0,
            seed: DEFAULT_SEED,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Add training waveforms for a label
    ///
    /// Repeated calls with the same label accumulate; labels may arrive
    /// in any order.
    pub fn add_rhythms(mut self, label: u32, waveforms: Vec<Waveform>) -> Self {
        self.training.entry(label).or_default().extend(waveforms);
        self
    }

    /// Set the hidden state count and symbol alphabet size
    pub fn with_model_parameters(mut self, n_states: usize, n_symbols: usize) -> Self {
        self.n_states = n_states;
        self.n_symbols = n_symbols;
        self
    }

    /// Set the seed driving codebook fitting and model initialization
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the Baum-Welch iteration cap
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Build the classifier, validating the configuration
    pub fn build(self) -> Result<RhythmClassifier> {
        if self.n_states == 0 {
            return Err(ClassifierError::MissingConfiguration("state count"));
        }
        if self.n_symbols == 0 {
            return Err(ClassifierError::MissingConfiguration("symbol count"));
        }

        Ok(RhythmClassifier::new(
            self.training,
            self.n_states,
            self.n_symbols,
            self.seed,
            self.max_iterations,
        ))
    }
}

//! Multi-class rhythm classifier

use crate::data::Waveform;
use crate::error::{ClassifierError, Result};
use crate::models::ClassModel;
use crate::quantize::{encode, trim_to_shared_length, Codebook};
use std::collections::BTreeMap;

/// One codebook shared across classes plus one trained HMM per class
///
/// Built by [`ClassifierBuilder`](super::ClassifierBuilder). Scoring is
/// rejected with `NotTrained` until `learn` has completed.
#[derive(Debug, Clone)]
pub struct RhythmClassifier {
    training: BTreeMap<u32, Vec<Waveform>>,
    n_states: usize,
    n_symbols: usize,
    seed: u64,
    max_iterations: usize,
    codebook: Option<Codebook>,
    models: BTreeMap<u32, ClassModel>,
}

impl RhythmClassifier {
    pub(crate) fn new(
        training: BTreeMap<u32, Vec<Waveform>>,
        n_states: usize,
        n_symbols: usize,
        seed: u64,
        max_iterations: usize,
    ) -> Self {
        Self {
            training,
            n_states,
            n_symbols,
            seed,
            max_iterations,
            codebook: None,
            models: BTreeMap::new(),
        }
    }

    /// Train the shared codebook and one model per label
    ///
    /// All classes' waveforms are trimmed to one shared length and
    /// clustered together, so every model reads the same alphabet. Each
    /// label's collection then becomes one symbol sequence for its model.
    /// Models are initialized from the same seed, which makes identical
    /// training data produce identical models.
    pub fn learn(&mut self) -> Result<()> {
        if self.training.is_empty() {
            return Err(ClassifierError::EmptyInput("no labeled rhythms"));
        }
        for waveforms in self.training.values() {
            if waveforms.is_empty() {
                return Err(ClassifierError::EmptyInput("label with no waveforms"));
            }
        }

        tracing::info!(
            "Training classifier: {} classes, {} states, {} symbols",
            self.training.len(),
            self.n_states,
            self.n_symbols
        );

        let combined: Vec<Waveform> = self.training.values().flatten().cloned().collect();
        let (length, vectors) = trim_to_shared_length(&combined)?;
        let codebook = Codebook::fit_seeded(&vectors, self.n_symbols, self.seed)?;

        tracing::debug!(
            "Fitted codebook: {} symbols over {}-sample vectors",
            codebook.symbol_count(),
            length
        );

        let mut models = BTreeMap::new();
        for (&label, waveforms) in &self.training {
            let symbols = encode(waveforms, &codebook)?;

            let mut model =
                ClassModel::new(self.n_states, self.n_symbols).with_seed(self.seed);
            let log_ll = model.train(&[symbols], self.max_iterations)?;

            tracing::debug!("Label {}: trained model, log-likelihood {:.4}", label, log_ll);
            models.insert(label, model);
        }

        self.codebook = Some(codebook);
        self.models = models;
        Ok(())
    }

    /// Predict the label of an unseen waveform collection
    ///
    /// Returns the label whose model assigns the highest log-likelihood;
    /// exact ties go to the lowest label.
    pub fn predict(&self, waveforms: &[Waveform]) -> Result<u32> {
        let scores = self.log_likelihoods(waveforms)?;

        let mut best: Option<(u32, f64)> = None;
        for (&label, &log_ll) in &scores {
            match best {
                Some((_, best_ll)) if log_ll <= best_ll => {}
                _ => best = Some((label, log_ll)),
            }
        }

        best.map(|(label, _)| label)
            .ok_or(ClassifierError::NotTrained)
    }

    /// Highest per-model log-likelihood for a waveform collection
    pub fn evaluate(&self, waveforms: &[Waveform]) -> Result<f64> {
        let scores = self.log_likelihoods(waveforms)?;
        scores
            .values()
            .copied()
            .fold(None, |best: Option<f64>, log_ll| match best {
                Some(b) if log_ll <= b => Some(b),
                _ => Some(log_ll),
            })
            .ok_or(ClassifierError::NotTrained)
    }

    /// Per-label log-likelihoods for a waveform collection
    pub fn log_likelihoods(&self, waveforms: &[Waveform]) -> Result<BTreeMap<u32, f64>> {
        let codebook = self.codebook.as_ref().ok_or(ClassifierError::NotTrained)?;
        let symbols = encode(waveforms, codebook)?;

        let mut scores = BTreeMap::new();
        for (&label, model) in &self.models {
            scores.insert(label, model.evaluate(&symbols)?);
        }
        Ok(scores)
    }

    /// Whether `learn` has completed
    pub fn is_trained(&self) -> bool {
        self.codebook.is_some()
    }

    /// Labels the classifier was configured with, ascending
    pub fn labels(&self) -> Vec<u32> {
        self.training.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClassifierBuilder;
    use std::time::Duration;

    fn wave(samples: &[f64]) -> Waveform {
        Waveform::from_samples(samples, Duration::from_millis(4))
    }

    fn low_waveforms() -> Vec<Waveform> {
        vec![
            wave(&[0.0, 0.1, 0.0, -0.1]),
            wave(&[0.1, 0.0, -0.1, 0.0]),
            wave(&[-0.1, 0.1, 0.0, 0.1]),
        ]
    }

    fn high_waveforms() -> Vec<Waveform> {
        vec![
            wave(&[100.0, 100.1, 99.9, 100.0]),
            wave(&[99.9, 100.0, 100.1, 100.0]),
            wave(&[100.1, 99.9, 100.0, 99.9]),
        ]
    }

    fn trained_two_class() -> RhythmClassifier {
        let mut classifier = ClassifierBuilder::new()
            .add_rhythms(1, low_waveforms())
            .add_rhythms(2, high_waveforms())
            .with_model_parameters(2, 2)
            .build()
            .unwrap();
        classifier.learn().unwrap();
        classifier
    }

    #[test]
    fn test_predict_separates_amplitude_bands() {
        let classifier = trained_two_class();

        let low_query = vec![wave(&[0.05, -0.05, 0.05, 0.0])];
        let high_query = vec![wave(&[100.05, 99.95, 100.0, 100.05])];

        assert_eq!(classifier.predict(&low_query).unwrap(), 1);
        assert_eq!(classifier.predict(&high_query).unwrap(), 2);
    }

    #[test]
    fn test_correct_model_scores_strictly_higher() {
        let classifier = trained_two_class();

        let scores = classifier
            .log_likelihoods(&[wave(&[0.0, 0.05, -0.05, 0.1])])
            .unwrap();

        assert!(scores[&1] > scores[&2]);
    }

    #[test]
    fn test_identical_training_data_ties_to_lowest_label() {
        let mut classifier = ClassifierBuilder::new()
            .add_rhythms(3, low_waveforms())
            .add_rhythms(7, low_waveforms())
            .with_model_parameters(2, 2)
            .build()
            .unwrap();
        classifier.learn().unwrap();

        let query = vec![wave(&[0.0, 0.1, 0.0, -0.1])];
        let scores = classifier.log_likelihoods(&query).unwrap();

        assert_eq!(scores[&3], scores[&7]);
        assert_eq!(classifier.predict(&query).unwrap(), 3);
    }

    #[test]
    fn test_predict_before_learn_fails() {
        let classifier = ClassifierBuilder::new()
            .add_rhythms(1, low_waveforms())
            .with_model_parameters(2, 2)
            .build()
            .unwrap();

        assert!(matches!(
            classifier.predict(&[wave(&[0.0, 0.1, 0.0, 0.1])]),
            Err(ClassifierError::NotTrained)
        ));
    }

    #[test]
    fn test_learn_without_data_fails() {
        let mut classifier = ClassifierBuilder::new()
            .with_model_parameters(2, 2)
            .build()
            .unwrap();

        assert!(matches!(
            classifier.learn(),
            Err(ClassifierError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_learn_rejects_label_without_waveforms() {
        let mut classifier = ClassifierBuilder::new()
            .add_rhythms(1, low_waveforms())
            .add_rhythms(2, vec![])
            .with_model_parameters(2, 2)
            .build()
            .unwrap();

        assert!(matches!(
            classifier.learn(),
            Err(ClassifierError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_short_query_is_dimension_mismatch() {
        let classifier = trained_two_class();

        let result = classifier.predict(&[wave(&[0.0, 0.1])]);

        assert!(matches!(
            result,
            Err(ClassifierError::DimensionMismatch {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_symbol_alphabet_larger_than_corpus_fails() {
        let mut classifier = ClassifierBuilder::new()
            .add_rhythms(1, low_waveforms())
            .with_model_parameters(2, 10)
            .build()
            .unwrap();

        assert!(matches!(
            classifier.learn(),
            Err(ClassifierError::InvalidConfiguration(_))
        ));
    }
}

//! End-to-end classification scenarios on generated rhythm data

use approx::assert_relative_eq;
use ecg_rhythm::classify::{ClassifierBuilder, RhythmClassifier};
use ecg_rhythm::data::{partition, Waveform, WaveformGenerator};
use ecg_rhythm::error::ClassifierError;
use std::time::Duration;

const TRAIN_COUNT: usize = 10;
const WINDOW: usize = 3;

/// Slow low-amplitude rhythms vs. fast high-amplitude rhythms on a
/// raised baseline; the two classes quantize to disjoint symbol groups
fn rhythm_classes() -> (Vec<Waveform>, Vec<Waveform>) {
    let count = TRAIN_COUNT + WINDOW * 2;

    let slow = WaveformGenerator::new(1.5, 1.0)
        .with_noise(0.05)
        .with_seed(42)
        .generate(count);
    let fast = WaveformGenerator::new(5.0, 2.0)
        .with_baseline(8.0)
        .with_noise(0.05)
        .with_seed(43)
        .generate(count);

    (slow, fast)
}

fn trained_classifier(slow: &[Waveform], fast: &[Waveform]) -> RhythmClassifier {
    let mut classifier = ClassifierBuilder::new()
        .add_rhythms(1, slow[..TRAIN_COUNT].to_vec())
        .add_rhythms(2, fast[..TRAIN_COUNT].to_vec())
        .with_model_parameters(5, 5)
        .build()
        .unwrap();
    classifier.learn().unwrap();
    classifier
}

#[test]
fn classifies_held_out_windows_for_both_rhythm_classes() {
    let (slow, fast) = rhythm_classes();
    let classifier = trained_classifier(&slow, &fast);

    assert_eq!(classifier.labels(), vec![1, 2]);

    for (expected, holdout) in [(1, &slow[TRAIN_COUNT..]), (2, &fast[TRAIN_COUNT..])] {
        let windows = partition(holdout, WINDOW, false);
        assert_eq!(windows.len(), 2);

        for window in windows {
            assert_eq!(classifier.predict(window).unwrap(), expected);
        }
    }
}

#[test]
fn correct_model_scores_strictly_higher_on_its_own_rhythms() {
    let (slow, fast) = rhythm_classes();
    let classifier = trained_classifier(&slow, &fast);

    let slow_scores = classifier
        .log_likelihoods(&slow[TRAIN_COUNT..TRAIN_COUNT + WINDOW])
        .unwrap();
    let fast_scores = classifier
        .log_likelihoods(&fast[TRAIN_COUNT..TRAIN_COUNT + WINDOW])
        .unwrap();

    assert!(slow_scores[&1] > slow_scores[&2]);
    assert!(fast_scores[&2] > fast_scores[&1]);
}

#[test]
fn evaluate_returns_the_winning_score() {
    let (slow, fast) = rhythm_classes();
    let classifier = trained_classifier(&slow, &fast);
    let query = &slow[TRAIN_COUNT..TRAIN_COUNT + WINDOW];

    let best = classifier.evaluate(query).unwrap();
    let scores = classifier.log_likelihoods(query).unwrap();
    let label = classifier.predict(query).unwrap();

    assert_eq!(best, scores[&label]);
    assert!(scores.values().all(|&log_ll| log_ll <= best));
}

#[test]
fn identical_training_data_ties_to_the_lowest_label() {
    let waveforms = WaveformGenerator::new(2.0, 1.0)
        .with_noise(0.05)
        .with_seed(11)
        .generate(TRAIN_COUNT + WINDOW);

    let mut classifier = ClassifierBuilder::new()
        .add_rhythms(4, waveforms[..TRAIN_COUNT].to_vec())
        .add_rhythms(9, waveforms[..TRAIN_COUNT].to_vec())
        .with_model_parameters(3, 3)
        .with_max_iterations(50)
        .build()
        .unwrap();
    classifier.learn().unwrap();

    let query = &waveforms[TRAIN_COUNT..];
    let scores = classifier.log_likelihoods(query).unwrap();

    assert_relative_eq!(scores[&4], scores[&9]);
    assert_eq!(classifier.predict(query).unwrap(), 4);
}

#[test]
fn repeated_training_runs_are_identical() {
    let (slow, fast) = rhythm_classes();

    let first = trained_classifier(&slow, &fast);
    let second = trained_classifier(&slow, &fast);

    let query = &fast[TRAIN_COUNT..TRAIN_COUNT + WINDOW];
    assert_eq!(
        first.log_likelihoods(query).unwrap(),
        second.log_likelihoods(query).unwrap()
    );
}

#[test]
fn scoring_is_stable_across_repeated_calls() {
    let (slow, fast) = rhythm_classes();
    let classifier = trained_classifier(&slow, &fast);
    let query = &slow[TRAIN_COUNT..TRAIN_COUNT + WINDOW];

    assert_eq!(
        classifier.log_likelihoods(query).unwrap(),
        classifier.log_likelihoods(query).unwrap()
    );
}

#[test]
fn build_fails_without_model_parameters() {
    let result = ClassifierBuilder::new().build();

    assert!(matches!(
        result,
        Err(ClassifierError::MissingConfiguration(_))
    ));
}

#[test]
fn predict_before_learn_is_rejected() {
    let (slow, _) = rhythm_classes();

    let classifier = ClassifierBuilder::new()
        .add_rhythms(1, slow[..TRAIN_COUNT].to_vec())
        .with_model_parameters(3, 3)
        .build()
        .unwrap();

    assert!(matches!(
        classifier.predict(&slow[TRAIN_COUNT..]),
        Err(ClassifierError::NotTrained)
    ));
}

#[test]
fn learn_without_rhythms_is_rejected() {
    let mut classifier = ClassifierBuilder::new()
        .with_model_parameters(3, 3)
        .build()
        .unwrap();

    assert!(matches!(
        classifier.learn(),
        Err(ClassifierError::EmptyInput(_))
    ));
}

#[test]
fn query_shorter_than_the_codebook_is_rejected() {
    let (slow, fast) = rhythm_classes();
    let classifier = trained_classifier(&slow, &fast);

    let short = vec![Waveform::from_samples(&[0.0; 10], Duration::from_millis(4))];

    assert!(matches!(
        classifier.predict(&short),
        Err(ClassifierError::DimensionMismatch {
            expected: 64,
            actual: 10
        })
    ));
}

#[test]
fn alphabet_larger_than_the_training_corpus_is_rejected() {
    let (slow, fast) = rhythm_classes();

    let mut classifier = ClassifierBuilder::new()
        .add_rhythms(1, slow[..TRAIN_COUNT].to_vec())
        .add_rhythms(2, fast[..TRAIN_COUNT].to_vec())
        .with_model_parameters(5, 2 * TRAIN_COUNT + 1)
        .build()
        .unwrap();

    assert!(matches!(
        classifier.learn(),
        Err(ClassifierError::InvalidConfiguration(_))
    ));
}

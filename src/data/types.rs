//! Data types for waveform readings

use ndarray::Array1;
use std::time::Duration;

/// Single amplitude sample from a recording session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformReading {
    /// Time elapsed since the start of the recording session
    pub elapsed: Duration,
    /// Measured amplitude in millivolts
    pub millivolts: f64,
}

impl WaveformReading {
    pub fn new(elapsed: Duration, millivolts: f64) -> Self {
        Self {
            elapsed,
            millivolts,
        }
    }
}

/// One waveform: a sequence of readings from a single source
///
/// Readings are kept in arrival order; amplitude extraction orders them by
/// elapsed time, so out-of-order rows in a source file are harmless.
#[derive(Debug, Clone, Default)]
pub struct Waveform {
    /// Raw readings in arrival order
    pub readings: Vec<WaveformReading>,
}

impl Waveform {
    /// Create an empty waveform
    pub fn new() -> Self {
        Self {
            readings: Vec::new(),
        }
    }

    /// Create from existing readings
    pub fn from_readings(readings: Vec<WaveformReading>) -> Self {
        Self { readings }
    }

    /// Create from evenly spaced amplitude samples
    pub fn from_samples(samples: &[f64], sample_interval: Duration) -> Self {
        let readings = samples
            .iter()
            .enumerate()
            .map(|(i, &mv)| WaveformReading::new(sample_interval * i as u32, mv))
            .collect();
        Self { readings }
    }

    /// Append one reading
    pub fn push(&mut self, reading: WaveformReading) {
        self.readings.push(reading);
    }

    /// Amplitude series in elapsed-time order
    ///
    /// The sort is stable, so readings with equal timestamps keep their
    /// arrival order.
    pub fn amplitudes(&self) -> Array1<f64> {
        let mut ordered = self.readings.clone();
        ordered.sort_by_key(|r| r.elapsed);
        Array1::from_iter(ordered.iter().map(|r| r.millivolts))
    }

    /// Number of readings
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

//! Synthetic waveform generation for demos and tests

use super::types::Waveform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;
use std::time::Duration;

/// Seeded generator of periodic waveforms
///
/// Each generated waveform is a sine of the configured frequency with a
/// random phase offset and optional uniform noise. Output is fully
/// determined by the seed and the configuration.
#[derive(Debug, Clone)]
pub struct WaveformGenerator {
    frequency_hz: f64,
    amplitude: f64,
    baseline: f64,
    sample_rate_hz: f64,
    samples_per_waveform: usize,
    noise: f64,
    seed: u64,
}

impl WaveformGenerator {
    /// Create a generator for the given frequency and amplitude
    pub fn new(frequency_hz: f64, amplitude: f64) -> Self {
        Self {
            frequency_hz,
            amplitude,
            baseline: 0.0,
            sample_rate_hz: 250.0,
            samples_per_waveform: 64,
            noise: 0.0,
            seed: 42,
        }
    }

    /// Set the constant baseline level added to every sample
    pub fn with_baseline(mut self, baseline: f64) -> Self {
        self.baseline = baseline;
        self
    }

    /// Set samples per second
    pub fn with_sample_rate(mut self, sample_rate_hz: f64) -> Self {
        self.sample_rate_hz = sample_rate_hz;
        self
    }

    /// Set samples per generated waveform
    pub fn with_samples(mut self, samples_per_waveform: usize) -> Self {
        self.samples_per_waveform = samples_per_waveform;
        self
    }

    /// Set uniform noise half-width in millivolts
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Set the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Generate `count` waveforms
    pub fn generate(&self, count: usize) -> Vec<Waveform> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let interval = Duration::from_secs_f64(1.0 / self.sample_rate_hz);

        (0..count)
            .map(|_| {
                let phase = rng.gen::<f64>() * TAU;
                let samples: Vec<f64> = (0..self.samples_per_waveform)
                    .map(|i| {
                        let t = i as f64 / self.sample_rate_hz;
                        let clean = self.baseline
                            + self.amplitude * (TAU * self.frequency_hz * t + phase).sin();
                        let jitter = if self.noise > 0.0 {
                            (rng.gen::<f64>() * 2.0 - 1.0) * self.noise
                        } else {
                            0.0
                        };
                        clean + jitter
                    })
                    .collect();
                Waveform::from_samples(&samples, interval)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_deterministic_for_seed() {
        let generator = WaveformGenerator::new(3.0, 1.5).with_noise(0.1).with_seed(7);

        let first = generator.generate(4);
        let second = generator.generate(4);

        assert_eq!(first.len(), 4);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.amplitudes().to_vec(), b.amplitudes().to_vec());
        }
    }

    #[test]
    fn test_waveforms_differ_by_phase() {
        let generator = WaveformGenerator::new(3.0, 1.0).with_seed(7);

        let waves = generator.generate(2);

        assert_ne!(
            waves[0].amplitudes().to_vec(),
            waves[1].amplitudes().to_vec()
        );
    }

    #[test]
    fn test_sample_count_and_spacing() {
        let generator = WaveformGenerator::new(1.0, 1.0)
            .with_sample_rate(100.0)
            .with_samples(10);

        let waves = generator.generate(1);

        assert_eq!(waves[0].len(), 10);
        assert_eq!(waves[0].readings[1].elapsed, Duration::from_millis(10));
    }
}

//! Waveform data module
//!
//! Provides reading/waveform types, CSV loading, partition helpers, and
//! synthetic waveform generation.

mod types;
mod loader;
mod partition;
mod synth;

pub use types::{Waveform, WaveformReading};
pub use loader::WaveformCsvReader;
pub use partition::{overlapped_partition, partition, take_next};
pub use synth::WaveformGenerator;

//! Trimming and symbol encoding of waveform batches

use super::codebook::Codebook;
use crate::data::Waveform;
use crate::error::{ClassifierError, Result};
use ndarray::Array1;

/// Trim a batch of waveforms to the length of its shortest member
///
/// Returns the shared length and one signal vector per waveform, in input
/// order. Each vector holds the first L samples in elapsed-time order.
pub fn trim_to_shared_length(waveforms: &[Waveform]) -> Result<(usize, Vec<Array1<f64>>)> {
    if waveforms.is_empty() {
        return Err(ClassifierError::EmptyInput("no waveforms to trim"));
    }

    let mut length = usize::MAX;
    for w in waveforms {
        if w.is_empty() {
            return Err(ClassifierError::EmptyInput("waveform with no readings"));
        }
        length = length.min(w.len());
    }

    let vectors = waveforms
        .iter()
        .map(|w| w.amplitudes().slice(ndarray::s![..length]).to_owned())
        .collect();

    Ok((length, vectors))
}

/// Trim a batch of waveforms to a known length
///
/// Inference-side counterpart of [`trim_to_shared_length`]: the length is
/// dictated by the fitted codebook, so a shorter waveform is an error
/// rather than a reason to shrink the batch.
pub fn trim_to_length(waveforms: &[Waveform], length: usize) -> Result<Vec<Array1<f64>>> {
    if waveforms.is_empty() {
        return Err(ClassifierError::EmptyInput("no waveforms to trim"));
    }
    if length == 0 {
        return Err(ClassifierError::EmptyInput("zero-length signal vector"));
    }

    waveforms
        .iter()
        .map(|w| {
            if w.len() < length {
                return Err(ClassifierError::DimensionMismatch {
                    expected: length,
                    actual: w.len(),
                });
            }
            Ok(w.amplitudes().slice(ndarray::s![..length]).to_owned())
        })
        .collect()
}

/// Encode a batch of waveforms as one symbol each
///
/// Waveforms are trimmed to the codebook's dimension and mapped through
/// nearest-centroid lookup. Output order matches input order; it is the
/// temporal order the class models consume.
pub fn encode(waveforms: &[Waveform], codebook: &Codebook) -> Result<Vec<usize>> {
    let vectors = trim_to_length(waveforms, codebook.dimension())?;

    vectors
        .iter()
        .map(|v| codebook.nearest_symbol(v))
        .collect()
}

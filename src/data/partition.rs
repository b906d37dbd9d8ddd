//! Slice partition helpers for carving training and validation groups

use crate::error::{ClassifierError, Result};

/// Split a slice into distinct chunks of `size` items
///
/// The trailing chunk with fewer than `size` items is included only when
/// `allow_incomplete` is set.
pub fn partition<T>(source: &[T], size: usize, allow_incomplete: bool) -> Vec<&[T]> {
    if size == 0 {
        return Vec::new();
    }

    let complete = source.len() / size;
    let mut parts: Vec<&[T]> = Vec::with_capacity(complete + 1);

    for p in 0..complete {
        parts.push(&source[p * size..(p + 1) * size]);
    }

    if allow_incomplete && complete * size < source.len() {
        parts.push(&source[complete * size..]);
    }

    parts
}

/// Split a slice into overlapping chunks of `size` items
///
/// Consecutive chunks share `overlap` items, so the start index advances by
/// `size - overlap`. Only full chunks are produced.
pub fn overlapped_partition<T>(source: &[T], size: usize, overlap: usize) -> Result<Vec<&[T]>> {
    if size <= overlap {
        return Err(ClassifierError::InvalidConfiguration(format!(
            "partition size {size} must be greater than overlap {overlap}"
        )));
    }

    let step = size - overlap;
    let mut parts = Vec::new();
    let mut start = 0;

    while start + size <= source.len() {
        parts.push(&source[start..start + size]);
        start += step;
    }

    Ok(parts)
}

/// Skip `skip` items, then yield every full window of `per_group` items
/// advancing one item at a time
pub fn take_next<T>(source: &[T], skip: usize, per_group: usize) -> Vec<&[T]> {
    let remainder = match source.get(skip..) {
        Some(r) => r,
        None => return Vec::new(),
    };

    if per_group == 0 {
        return Vec::new();
    }

    remainder.windows(per_group).collect()
}

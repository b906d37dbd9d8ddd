//! Classifier error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the quantization and classification pipeline
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("missing configuration: {0} must be set before building")]
    MissingConfiguration(&'static str),

    #[error("symbol {symbol} outside alphabet of size {alphabet}")]
    SymbolOutOfRange { symbol: usize, alphabet: usize },

    #[error("classifier has not been trained; call learn() first")]
    NotTrained,

    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {path:?} at line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Result type for classifier operations
pub type Result<T> = std::result::Result<T, ClassifierError>;

//! Error types for dataset loading.

use thiserror::Error;

/// Errors raised while loading the dataset files.
///
/// Individual malformed rows are never errors: parsing drops them with a
/// warning and preprocessing filters them. These variants cover whole-file
/// problems only.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found at the expected path
    #[error("failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV reader could not be constructed over a file
    #[error("unreadable CSV file {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;

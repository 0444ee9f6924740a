//! Error types for the data-loader crate.
//!
//! Every failure while reading a filmography dataset or building entity keys
//! ends up as one of these variants, so callers can tell a missing file from
//! a malformed line from a dangling credit.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataLoadError {
    /// A dataset file is absent from the directory
    #[error("Dataset file not found: {path}")]
    FileNotFound { path: String },

    #[error("I/O error while reading dataset: {0}")]
    IoError(#[from] std::io::Error),

    /// A line could not be split into the fields its file expects
    #[error("{file}:{line}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A kind, status or other enumerated field holds an unknown value
    #[error("Unknown {field} '{value}'")]
    InvalidValue { field: String, value: String },

    /// A credit points at a person or title that was never loaded
    #[error("Credit references unknown {entity} {key}")]
    MissingReference { entity: String, key: String },

    /// A string could not be turned into an entity key
    #[error("Invalid entity key '{input}': {reason}")]
    InvalidKey { input: String, reason: String },
}

pub type Result<T> = std::result::Result<T, DataLoadError>;

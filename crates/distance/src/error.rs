//! Errors returned by a distance query.

use data_loader::EntityKey;
use relations::FetchError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DistanceError {
    /// A limit was given but is not a positive integer. Raised before any fetch.
    #[error("{name} must be a positive integer or absent, got {value}")]
    InvalidLimit { name: &'static str, value: i64 },

    /// Relations of an entity could not be fetched; the whole query is abandoned.
    #[error("Failed to fetch relations for {key}")]
    FetchFailure {
        key: EntityKey,
        #[source]
        source: FetchError,
    },
}

impl From<FetchError> for DistanceError {
    fn from(source: FetchError) -> Self {
        DistanceError::FetchFailure {
            key: source.key().clone(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DistanceError>;

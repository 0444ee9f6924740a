//! Per-step exploration limits.
//!
//! `movie_limit` caps how many of each endpoint's movies are paired up,
//! `actor_limit` caps how many cast members of each paired movie are
//! paired up. Both bound the number of fetches a query can make.

use crate::error::{DistanceError, Result};
use std::num::NonZeroUsize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    actor_limit: Option<NonZeroUsize>,
    movie_limit: Option<NonZeroUsize>,
}

impl SearchLimits {
    /// No caps on either step
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Validate raw limits. `None` means unbounded; zero or negative is rejected.
    pub fn try_new(actor_limit: Option<i64>, movie_limit: Option<i64>) -> Result<Self> {
        Ok(Self {
            actor_limit: validate_limit("actor_limit", actor_limit)?,
            movie_limit: validate_limit("movie_limit", movie_limit)?,
        })
    }

    pub fn with_actor_limit(mut self, limit: NonZeroUsize) -> Self {
        self.actor_limit = Some(limit);
        self
    }

    pub fn with_movie_limit(mut self, limit: NonZeroUsize) -> Self {
        self.movie_limit = Some(limit);
        self
    }

    pub fn actor_limit(&self) -> Option<NonZeroUsize> {
        self.actor_limit
    }

    pub fn movie_limit(&self) -> Option<NonZeroUsize> {
        self.movie_limit
    }

    /// Number of cast members to take per movie
    pub(crate) fn actors(&self) -> usize {
        self.actor_limit.map_or(usize::MAX, NonZeroUsize::get)
    }

    /// Number of movies to take per endpoint
    pub(crate) fn movies(&self) -> usize {
        self.movie_limit.map_or(usize::MAX, NonZeroUsize::get)
    }
}

fn validate_limit(name: &'static str, limit: Option<i64>) -> Result<Option<NonZeroUsize>> {
    match limit {
        None => Ok(None),
        Some(value) => usize::try_from(value)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Some)
            .ok_or(DistanceError::InvalidLimit { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_limits_are_unbounded() {
        let limits = SearchLimits::try_new(None, None).unwrap();
        assert_eq!(limits, SearchLimits::unbounded());
        assert_eq!(limits.actors(), usize::MAX);
        assert_eq!(limits.movies(), usize::MAX);
    }

    #[test]
    fn test_positive_limits() {
        let limits = SearchLimits::try_new(Some(3), Some(5)).unwrap();
        assert_eq!(limits.actors(), 3);
        assert_eq!(limits.movies(), 5);
    }

    #[test]
    fn test_zero_and_negative_limits_are_rejected() {
        assert_eq!(
            SearchLimits::try_new(None, Some(0)),
            Err(DistanceError::InvalidLimit {
                name: "movie_limit",
                value: 0
            })
        );
        assert_eq!(
            SearchLimits::try_new(Some(-2), None),
            Err(DistanceError::InvalidLimit {
                name: "actor_limit",
                value: -2
            })
        );
    }
}

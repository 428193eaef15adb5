//! Cache error types.

use std::fmt;

/// Cache operation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The cache is full and no expired entries could be evicted.
    CapacityExceeded {
        /// The configured capacity.
        capacity: usize,
    },
    /// The cache backend is unavailable.
    Unavailable(String),
    /// Invalid cache configuration.
    Configuration(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { capacity } => {
                write!(f, "cache capacity of {capacity} entries exceeded")
            }
            Self::Unavailable(msg) => write!(f, "cache unavailable: {msg}"),
            Self::Configuration(msg) => write!(f, "cache configuration error: {msg}"),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

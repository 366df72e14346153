use thiserror::Error;

use crate::capacity::MAX_CAPACITY;

/// Error returned when a bounded queue cannot be built for the requested maximum size.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidCapacity {
    #[error("max size must be positive, got {requested}")]
    NotPositive { requested: i64 },

    #[error("max size {requested} needs a capacity above the limit of {limit}")]
    ExceedsLimit { requested: i64, limit: usize },

    #[error("max size does not fit in a 64-bit signed integer")]
    Unrepresentable,
}

impl InvalidCapacity {
    pub(crate) const fn exceeds_limit(requested: i64) -> Self {
        Self::ExceedsLimit {
            requested,
            limit: MAX_CAPACITY,
        }
    }
}

//! Error taxonomy shared by every container and algorithm in the crate.
//!
//! Three kinds of failure exist:
//!
//! - **Validation**: bad dimensions, size mismatches, out-of-range indices or
//!   fold parameters. The receiver is left untouched and the caller decides
//!   how to proceed.
//! - **Not ready**: an operation needs state that has not been prepared yet
//!   (for example fold retrieval before [`setup_k_folds`]).
//! - **Allocation**: the container could not reserve memory. It has already
//!   reset itself to the empty state; this is the only fatal variant.
//!
//! [`setup_k_folds`]: crate::data::ClassificationData::setup_k_folds

use briny::prelude::ValidationError;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, GrtError>;

/// Every way an operation in this crate can fail.
#[derive(Debug, thiserror::Error)]
pub enum GrtError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not ready: {0}")]
    NotReady(String),

    #[error("failed to allocate a {rows}x{cols} buffer")]
    Allocation { rows: usize, cols: usize },

    #[error("corrupt byte stream: {0}")]
    Corrupt(String),

    #[error("restored payload failed its integrity check")]
    Integrity(#[from] ValidationError),
}

impl GrtError {
    /// Returns `true` for failures the caller cannot recover from locally.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GrtError::Allocation { .. })
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        GrtError::Validation(msg.into())
    }

    pub(crate) fn not_ready(msg: impl Into<String>) -> Self {
        GrtError::NotReady(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_allocation_is_fatal() {
        assert!(GrtError::Allocation { rows: 2, cols: 3 }.is_fatal());
        assert!(!GrtError::validation("bad").is_fatal());
        assert!(!GrtError::not_ready("later").is_fatal());
        assert!(!GrtError::Corrupt("eof".into()).is_fatal());
    }

    #[test]
    fn messages_name_the_failure() {
        let err = GrtError::Allocation { rows: 4, cols: 5 };
        assert_eq!(err.to_string(), "failed to allocate a 4x5 buffer");
        let err = GrtError::validation("K can not be zero");
        assert_eq!(err.to_string(), "validation failed: K can not be zero");
    }
}

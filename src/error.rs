//! # Pool Error Types
//!
//! Errors that can occur while constructing or collecting a [`crate::Pool`].

use thiserror::Error;

/// Errors that can occur in the pool's construction and collection paths.
///
/// Allocation exhaustion is deliberately not a variant here: the distilled
/// contract treats it as a routine, pollable outcome reported via
/// [`crate::PoolId::NONE`], not an exceptional one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// `cell_size` was zero; a cell with no payload makes no sense.
    #[error("cell size must be greater than zero")]
    ZeroCellSize,

    /// `initial_capacity` was zero for a growable pool.
    #[error("initial capacity must be at least one cell")]
    ZeroCapacity,

    /// A fixed pool's backing region is too small to hold even one cell
    /// after bookkeeping overhead is reserved.
    #[error("fixed storage too small: need at least {required} bytes, have {available}")]
    InsufficientStorage {
        /// Bytes required for bookkeeping overhead plus one cell.
        required: usize,
        /// Bytes actually supplied.
        available: usize,
    },

    /// The mark callback returned a non-zero status; the sweep for this
    /// collection was skipped.
    #[error("mark callback returned non-zero status {0}")]
    MarkCallbackFailed(i32),
}

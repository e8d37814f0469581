//! Engine error taxonomy
//!
//! No-op conditions (nothing to transition, order already in flight, index
//! out of range) are not errors; they resolve to [`crate::CommitOutcome`]
//! variants. Store failures are recoverable: the write path rolls back and
//! schedules a reconciliation instead of propagating across the optimistic
//! mutation boundary.

use thiserror::Error;

/// Failure reported by a persistence or fetch collaborator
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Transport-level failure (timeout, connection refused, bad gateway)
    #[error("request failed: {0}")]
    Transport(String),
    /// The server processed the call and refused it
    #[error("rejected: {0}")]
    Rejected(String),
}

/// Engine-level error
#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

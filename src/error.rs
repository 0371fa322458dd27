//! Crate-wide error taxonomy
//!
//! Nothing here is fatal to the process: `NotFound` is an idempotent no-op,
//! `SessionUnavailable` is retryable with the record preserved, and
//! `MalformedRecord` is recovered at load time by dropping the offending
//! record. Callers map these to UI-level messaging.

use thiserror::Error;

/// Result kind returned by history and restore operations.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// Record or sub-unit absent. Always non-fatal; the operation was a
    /// no-op.
    #[error("closure record or unit not found")]
    NotFound,

    /// The live session cannot currently accept new units. The record
    /// stays in history so the caller may retry.
    #[error("live session unavailable: {0}")]
    SessionUnavailable(String),

    /// A persisted record violated the model invariants.
    #[error("malformed closure record: {0}")]
    MalformedRecord(String),

    /// Illegal two-phase close transition, e.g. commit after revert. A
    /// programming error surfaced as a result, not silently ignored.
    #[error("invalid close transition: closure is already {state}")]
    InvalidTransition { state: &'static str },

    /// Persistence adapter failure. Only surfaced from explicit load/save
    /// calls; background flushes log and continue.
    #[error("persistence failure: {0}")]
    Persistence(#[from] anyhow::Error),
}

pub type HistoryResult<T> = Result<T, HistoryError>;

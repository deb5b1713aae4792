//! Error types shared by the trace engine crates.
//!
//! Uses `thiserror` for structured, matchable error variants. Expected
//! algorithm outcomes (target not found, negative cycle, no solution) are
//! never errors; they are terminal step records.

use serde::Serialize;
use thiserror::Error;

/// Errors produced while recording or validating a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceError {
    /// The input does not match the shape the selected algorithm expects.
    #[error("invalid input for '{algorithm}': expected {expected_shape} ({reason})")]
    InvalidInput {
        algorithm: String,
        expected_shape: String,
        reason: String,
    },

    /// No generator is registered under the requested id.
    #[error("unknown algorithm: '{id}'")]
    UnknownAlgorithm { id: String },

    /// The run emitted more steps than the recorder allows.
    #[error("step limit ({limit}) exceeded")]
    StepLimitExceeded { limit: usize },

    /// A step log violates the ordering or terminal invariants.
    #[error("malformed trace: {reason}")]
    MalformedTrace { reason: String },
}

impl TraceError {
    /// Returns true for errors caused by the caller's request rather than
    /// by a recorder or generator bug.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            TraceError::InvalidInput { .. } | TraceError::UnknownAlgorithm { .. }
        )
    }
}

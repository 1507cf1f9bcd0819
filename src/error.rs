//! Failure taxonomy for solver runs and the distributed protocol
//!
//! Every failure in heatbench is fatal: there is no retry or recovery logic
//! beyond the worker's bounded connect loop. The variants here exist so that
//! callers (and tests) can tell a refused connection from a protocol
//! violation from a malformed chunk, instead of matching on error strings.
//!
//! Errors are propagated as `anyhow::Error` with `.context()` added at each
//! seam; a `HeatError` at the root of the chain stays downcastable via
//! `err.downcast_ref::<HeatError>()`.

use thiserror::Error;

/// Fatal error conditions recognized by the solvers and the wire protocol
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeatError {
    /// Rejected run parameters (dimensions, worker counts, flag combinations)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to establish a connection (dial, accept, or retry exhaustion)
    #[error("connection failed: {0}")]
    Connection(String),

    /// Peer closed the socket in the middle of a length-prefixed frame
    #[error("connection closed mid-frame ({0})")]
    ConnectionClosed(String),

    /// Length prefix above the frame sanity cap
    #[error("frame of {got} bytes exceeds the {cap} byte cap")]
    FrameTooLarge { got: u64, cap: u64 },

    /// Peer sent a message the current state does not accept
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// A chunk arrived with a width that disagrees with the configured grid
    #[error("chunk shape mismatch: expected {expected} columns, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// The partitioner produced fewer ranges than there are workers to feed
    #[error("insufficient work: {rows} interior rows cannot feed {workers} workers")]
    InsufficientWork { rows: usize, workers: usize },
}

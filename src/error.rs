//! Error taxonomy for the comparison harness.
//!
//! Two layers, deliberately kept apart:
//!
//! - [`CurveError`]: a candidate implementation rejecting or failing to
//!   represent an input. Recovered at the invoker boundary, surfaced as a
//!   `Failure` outcome in the row, never fatal, never retried.
//! - [`BenchError`]: setup failures (report sink cannot be opened, a
//!   registry lookup misses). These abort the affected sweep convention.

use std::path::PathBuf;

/// Deterministic rejection by a candidate implementation ("revert").
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CurveError {
    #[error("invalid reserve ratio representation: {0}")]
    InvalidRatio(String),

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("input outside candidate domain: {0}")]
    Domain(String),

    #[error("sell amount {amount} exceeds supply {supply}")]
    AmountExceedsSupply { amount: u128, supply: u128 },

    #[error("amount must be positive")]
    ZeroAmount,
}

/// Fatal setup or I/O failure for one sweep convention.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("failed to open report table {path}: {source}")]
    SinkOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("report write failed: {0}")]
    SinkWrite(#[from] std::io::Error),

    #[error("unknown candidate: {0}")]
    UnknownCandidate(String),

    #[error("invalid sweep setup: {0}")]
    Setup(String),
}

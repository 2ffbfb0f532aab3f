//! Error types for the navrank engine.
//!
//! Only universe-level and benchmark-level failures ever surface as errors.
//! Per-fund problems are turned into rejected outcomes by the pipelines and
//! never reach this type.

use thiserror::Error;

/// The main error type for navrank operations.
#[derive(Debug, Error)]
pub enum NavRankError {
    /// The scheme universe could not be fetched. Fatal for a run.
    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    /// No benchmark series could be resolved for the run. Fatal for a run.
    #[error("Benchmark unavailable: {0}")]
    BenchmarkUnavailable(String),

    /// Error fetching data from an external provider.
    #[error("Data fetch error: {0}")]
    DataFetch(String),

    /// Error when data is insufficient for the requested operation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Error when a date is out of range or invalid.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Invalid or inconsistent configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for navrank operations.
pub type Result<T> = std::result::Result<T, NavRankError>;

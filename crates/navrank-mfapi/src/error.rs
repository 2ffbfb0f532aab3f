//! Error types for the MFAPI and Kuvera clients.

use navrank_traits::NavRankError;
use thiserror::Error;

/// Errors that can occur when talking to the upstream fund APIs.
#[derive(Debug, Error)]
pub enum MfApiError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// The API answered with a non-success status.
    #[error("API error: HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// Retryable failures persisted past the retry budget.
    #[error("Giving up on {url} after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Requested URL.
        url: String,
        /// Attempts made.
        attempts: u32,
        /// Last failure seen.
        last: String,
    },
}

impl From<MfApiError> for NavRankError {
    fn from(err: MfApiError) -> Self {
        Self::DataFetch(err.to_string())
    }
}

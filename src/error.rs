//! Error types surfaced at the crate boundary.

use thiserror::Error;

/// Errors from building or running a [`Runner`](crate::Runner).
#[derive(Debug, Error)]
pub enum Error {
    /// The target host could not be parsed as a URL.
    #[error("invalid host url `{url}`: {source}")]
    InvalidHost {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// The shared HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    /// The combination space does not fit in a `u64`.
    #[error("combination space too large to enumerate")]
    MatrixTooLarge,
    /// A worker task panicked, which only caller-supplied closures can do.
    #[error("worker task failed: {0}")]
    Worker(tokio::task::JoinError),
}

/// Errors from structured lookups on a response body.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The body is not valid JSON.
    #[error("unable to parse body as json: {0}")]
    Parse(#[from] serde_json::Error),
    /// The path did not resolve to a value.
    #[error("path `{path}` did not resolve: {reason}")]
    Path { path: String, reason: String },
    /// The path resolved, but not to a string.
    #[error("value at `{path}` is not a string")]
    NotAString { path: String },
}

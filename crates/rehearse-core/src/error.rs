//! Error types for the streaming consumer and the plain API clients.

use reqwest::StatusCode;

/// Terminal failure of one streaming session.
///
/// Transport problems, non-OK statuses and in-stream `error` payloads all
/// end the session; malformed `data:` lines do not (they are logged and
/// skipped by the decoder).
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The response status was not successful
    #[error("HTTP error! status: {0}")]
    Status(StatusCode),

    /// Network-level failure while connecting or reading the body
    #[error("stream transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend reported an error inside an otherwise well-formed stream
    #[error("{0}")]
    Upstream(String),

    /// The session was superseded by `reset()` or a newer `start()`
    #[error("stream cancelled")]
    Cancelled,
}

/// Failure of a plain request/response endpoint call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The response status was not successful
    #[error("HTTP error! status: {0}")]
    Status(StatusCode),

    /// Network-level failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend reported an error in the reply body
    #[error("backend error: {0}")]
    Backend(String),

    /// The endpoint requires a bearer token and none is configured
    #[error("no auth token found, please log in")]
    NotAuthenticated,

    /// The token provider failed to produce a token
    #[error("auth failed: {0}")]
    Auth(#[source] anyhow::Error),

    /// A reply carried audio that was not valid base64
    #[error("invalid audio payload: {0}")]
    Audio(#[from] base64::DecodeError),

    /// The resume file extension is not one the backend accepts
    #[error("unsupported resume format: {0}")]
    UnsupportedResume(String),

    /// Local file I/O failed (resume upload)
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

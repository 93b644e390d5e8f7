//! Page fetch error types.

/// Errors from fetching a listing or timetable page.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// The request limiter was shut down
    #[error("request limiter closed")]
    Closed,

    /// No page is available for this identifier
    #[error("no page available for {0}")]
    Missing(String),

    /// A saved page could not be read
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
}

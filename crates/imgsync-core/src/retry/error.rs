//! Fetch error type for retry classification.

/// Error returned by a single GET (curl failure or HTTP error).
/// Kept typed so the retry layer can classify it before it reaches the downloader.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, TLS verification, bad URL, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
}

impl FetchError {
    /// HTTP status, if the server answered.
    pub fn status(&self) -> Option<u32> {
        match self {
            FetchError::Http(code) => Some(*code),
            FetchError::Curl(_) => None,
        }
    }
}

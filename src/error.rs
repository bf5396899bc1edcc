use thiserror::Error;

/// Failure of a single page fetch. Never surfaced to API callers; the
/// retrieval strategy logs it and moves on to the next source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("empty body")]
    Empty,
}

impl From<chromiumoxide::error::CdpError> for FetchError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Self::Browser(err.to_string())
    }
}

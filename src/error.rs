use thiserror::Error;

/// Failure attached to a terminal [`MetadataResult`](crate::metadata::MetadataResult).
///
/// None of these are returned to the caller as `Err`; they travel inside the
/// published result next to the classified state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{message}")]
    HttpStatus { status: u16, message: String },
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Invalid JSON metadata: {0}")]
    InvalidJson(String),
    #[error("No async runtime available to fetch metadata")]
    NoRuntime,
}

impl MetadataError {
    /// HTTP status code, for non-2xx responses.
    pub fn status(&self) -> Option<u16> {
        match self {
            MetadataError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for MetadataError {
    fn from(e: reqwest::Error) -> Self {
        MetadataError::Transport(e.to_string())
    }
}

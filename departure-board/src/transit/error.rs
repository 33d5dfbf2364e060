//! Transport error types.

/// Errors from fetching transit API documents.
///
/// Any of these fails the whole load; they are shown to the user and
/// never retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the API
    #[error("rate limited by transit API")]
    RateLimited,

    /// Invalid API key
    #[error("unauthorized (invalid API key)")]
    Unauthorized,

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Client could not be set up, or fixtures could not be read
    #[error("configuration error: {0}")]
    Config(String),
}

impl TransportError {
    /// HTTP status associated with the error, if there was a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Http(e) => e.status().map(|s| s.as_u16()),
            TransportError::Api { status, .. } => Some(*status),
            TransportError::RateLimited => Some(429),
            TransportError::Unauthorized => Some(401),
            TransportError::Json { .. } | TransportError::Config(_) => None,
        }
    }
}

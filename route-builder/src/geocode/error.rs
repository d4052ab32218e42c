//! Geocoder error types.

/// Errors from the reverse geocoding service.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the service
    #[error("rate limited by geocoding service")]
    RateLimited,

    /// Failed to parse the response
    #[error("JSON parse error: {message}")]
    Json { message: String },
}

impl GeocodeError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            GeocodeError::Http(_) | GeocodeError::RateLimited => true,
            GeocodeError::Api { status, .. } => *status >= 500,
            GeocodeError::Json { .. } => false,
        }
    }
}

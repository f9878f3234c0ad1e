//! Error types for somnair-core.
//!
//! Only the air-quality lookup can fail; risk evaluation is infallible.
//!
//! | Error | Meaning | Retry? |
//! |-------|---------|--------|
//! | [`LookupError::NotFound`] | Place name did not geocode | No, ask for another name |
//! | [`LookupError::DataUnavailable`] | Place resolved, no PM2.5 value | Later |
//! | [`LookupError::Network`] | Timeout or connection failure | Caller decides |
//! | [`LookupError::Api`] | Non-success status from the provider | Caller decides |
//! | [`LookupError::InvalidResponse`] | Body could not be decoded | No |
//!
//! The client itself never retries.

use thiserror::Error;

/// Errors returned by an [`crate::AirQualitySource`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LookupError {
    /// The location could not be resolved to coordinates.
    #[error("Location '{location}' not found")]
    NotFound { location: String },

    /// The location resolved but no PM2.5 value is available.
    #[error("No PM2.5 data available for {location}")]
    DataUnavailable { location: String },

    /// The provider could not be reached or timed out.
    #[error("Air quality provider not reachable at {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-success status.
    #[error("Air quality provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The provider's response body could not be decoded.
    #[error("Invalid response from air quality provider: {0}")]
    InvalidResponse(String),

    /// The client could not be built from its configuration.
    #[error("Invalid lookup configuration: {0}")]
    InvalidConfig(String),
}

impl LookupError {
    /// Whether the failure is a transport problem (timeout, refused connection,
    /// provider error) rather than a definitive answer about the location.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            LookupError::Network { .. } | LookupError::Api { .. } | LookupError::InvalidResponse(_)
        )
    }

    /// Whether the failure was a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, LookupError::Network { source, .. } if source.is_timeout())
    }
}

/// Result type for lookup operations.
pub type Result<T> = std::result::Result<T, LookupError>;

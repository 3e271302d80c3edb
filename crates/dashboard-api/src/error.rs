//! Error types for backend calls

use crate::ticker::TickerError;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single backend call
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the connection dropped
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    /// The backend answered with a non-2xx status
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// The body did not have the expected shape
    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    /// The request exceeded its deadline
    #[error("Request timed out after {}s", .after.as_secs_f64())]
    Timeout { after: Duration },

    /// A ticker failed local validation before any request was made
    #[error("Invalid ticker: {0}")]
    InvalidTicker(#[from] TickerError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ApiError {
    /// Build a shape-check failure for an endpoint
    pub fn malformed(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Map a transport failure, keeping timeouts distinct from other network errors
    pub fn from_transport(url: &str, err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout { after: timeout }
        } else {
            Self::Network {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// Short name of the error class, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Http { .. } => "http",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::Timeout { .. } => "timeout",
            Self::InvalidTicker(_) => "invalid_ticker",
            Self::ConfigError(_) => "config",
        }
    }
}

/// Result type alias for backend calls
pub type Result<T> = std::result::Result<T, ApiError>;

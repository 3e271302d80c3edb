//! Error types for the dashboard session

use dashboard_api::{ApiError, TickerError};
use thiserror::Error;

/// Dashboard specific errors
#[derive(Debug, Error)]
pub enum DashboardError {
    /// A backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A ticker typed by the user failed validation
    #[error("Invalid ticker: {0}")]
    InvalidTicker(#[from] TickerError),

    /// Path did not match any route
    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    /// Command parsing or dispatch error
    #[error("Command error: {0}")]
    CommandError(String),

    /// Selection did not match a visible entry
    #[error("Nothing to open: {0}")]
    Selection(String),

    /// Writing a chart file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

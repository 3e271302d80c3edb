//! Shared utilities for the stock dashboard
//!
//! This crate provides common functionality used across the workspace,
//! including logging setup and typed access to environment overrides.

pub mod env;
pub mod logging;

pub use env::{EnvError, env_duration_secs, env_string};
pub use logging::{ENV_LOG_FORMAT, LogFormat, LogOptions, init_tracing};

//! Logging and tracing utilities

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_DIRECTIVES: &str = "warn,dashboard_api=info,dashboard_app=info";

/// Environment variable selecting the log line format
pub const ENV_LOG_FORMAT: &str = "DASHBOARD_LOG_FORMAT";

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable single-line output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Parse a format name, falling back to `Pretty` for anything unknown
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }

    /// Format named by `DASHBOARD_LOG_FORMAT`, `Pretty` when unset
    pub fn from_env() -> Self {
        crate::env::env_string(ENV_LOG_FORMAT)
            .map(|name| Self::from_name(&name))
            .unwrap_or_default()
    }
}

/// Options for [`init_tracing`]
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Filter directives used when `RUST_LOG` is absent
    pub default_directives: String,
    /// Raise the fallback level to `debug`
    pub verbose: bool,
    /// Line format
    pub format: LogFormat,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            default_directives: DEFAULT_DIRECTIVES.to_string(),
            verbose: false,
            format: LogFormat::Pretty,
        }
    }
}

impl LogOptions {
    /// Directives applied when the environment does not provide a filter
    pub fn fallback_directives(&self) -> &str {
        if self.verbose {
            "debug"
        } else {
            &self.default_directives
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// Logs go to stderr so they never interleave with rendered views on stdout.
/// `RUST_LOG` always wins over the configured fallback.
pub fn init_tracing(options: &LogOptions) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.fallback_directives()));
    let registry = tracing_subscriber::registry().with(filter);

    match options.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    }
}

//! Configuration for the backend client

use crate::error::{ApiError, Result};
use dashboard_utils::{env_duration_secs, env_string};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Backend address used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable overriding the backend address
pub const ENV_BASE_URL: &str = "DASHBOARD_API_BASE";
/// Environment variable overriding the transport timeout (seconds)
pub const ENV_TIMEOUT_SECS: &str = "DASHBOARD_TIMEOUT_SECS";
/// Environment variable selecting the aggregate prediction path
pub const ENV_SP500_ROUTE: &str = "DASHBOARD_SP500_ROUTE";

/// Path serving the aggregate (S&P 500) predictions.
///
/// Backends have shipped both spellings, so the client lets the operator pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sp500Route {
    /// `/predict/sp500`
    #[default]
    Predict,
    /// `/predict-sp500`
    Legacy,
}

impl Sp500Route {
    /// Parse a route name (`predict` or `legacy`, or the literal path)
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "predict" | "/predict/sp500" | "predict/sp500" => Ok(Self::Predict),
            "legacy" | "/predict-sp500" | "predict-sp500" => Ok(Self::Legacy),
            other => Err(ApiError::ConfigError(format!(
                "unknown sp500 route '{other}', expected 'predict' or 'legacy'"
            ))),
        }
    }

    /// Path segments below the base URL
    pub fn segments(self) -> &'static [&'static str] {
        match self {
            Self::Predict => &["predict", "sp500"],
            Self::Legacy => &["predict-sp500"],
        }
    }
}

/// Configuration for backend calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the prediction backend
    pub base_url: String,

    /// Transport timeout applied to every request
    pub request_timeout: Duration,

    /// Which aggregate prediction path the backend serves
    pub sp500_route: Sp500Route,

    /// User-Agent header sent with each request
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            sp500_route: Sp500Route::Predict,
            user_agent: format!("stock-dashboard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiConfig {
    /// Create a new configuration builder
    pub fn builder() -> ApiConfigBuilder {
        ApiConfigBuilder::default()
    }

    /// Defaults overlaid with `DASHBOARD_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env()?.build()
    }

    /// Parsed base URL
    pub fn parsed_base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            ApiError::ConfigError(format!("invalid base URL '{}': {e}", self.base_url))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::ConfigError(format!(
                "base URL must be http or https, got '{}'",
                url.scheme()
            )));
        }

        if url.cannot_be_a_base() {
            return Err(ApiError::ConfigError(format!(
                "base URL '{}' cannot carry a path",
                self.base_url
            )));
        }

        Ok(url)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.parsed_base_url()?;

        if self.request_timeout.is_zero() {
            return Err(ApiError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for ApiConfig
#[derive(Debug, Default)]
pub struct ApiConfigBuilder {
    base_url: Option<String>,
    request_timeout: Option<Duration>,
    sp500_route: Option<Sp500Route>,
    user_agent: Option<String>,
}

impl ApiConfigBuilder {
    /// Set the backend base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the transport timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the aggregate prediction path
    pub fn sp500_route(mut self, route: Sp500Route) -> Self {
        self.sp500_route = Some(route);
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Fill unset fields from the environment
    pub fn with_env(mut self) -> Result<Self> {
        if self.base_url.is_none() {
            self.base_url = env_string(ENV_BASE_URL);
        }

        if self.request_timeout.is_none() {
            self.request_timeout = env_duration_secs(ENV_TIMEOUT_SECS)
                .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        }

        if self.sp500_route.is_none() {
            if let Some(name) = env_string(ENV_SP500_ROUTE) {
                self.sp500_route = Some(Sp500Route::from_name(&name)?);
            }
        }

        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<ApiConfig> {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            base_url: self.base_url.unwrap_or(defaults.base_url),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            sp500_route: self.sp500_route.unwrap_or(defaults.sp500_route),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.sp500_route, Sp500Route::Predict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ApiConfig::builder()
            .base_url("https://predictions.example.com/api/")
            .request_timeout(Duration::from_secs(5))
            .sp500_route(Sp500Route::Legacy)
            .build()
            .unwrap();

        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.sp500_route, Sp500Route::Legacy);
    }

    #[test]
    fn test_validation_rejects_bad_urls() {
        let err = ApiConfig::builder().base_url("not a url").build();
        assert!(matches!(err, Err(ApiError::ConfigError(_))));

        let err = ApiConfig::builder().base_url("ftp://localhost").build();
        assert!(matches!(err, Err(ApiError::ConfigError(_))));

        let err = ApiConfig::builder()
            .base_url("mailto:ops@example.com")
            .build();
        assert!(matches!(err, Err(ApiError::ConfigError(_))));
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let err = ApiConfig::builder()
            .request_timeout(Duration::ZERO)
            .build();
        assert!(matches!(err, Err(ApiError::ConfigError(_))));
    }

    #[test]
    fn test_sp500_route_names() {
        assert_eq!(
            Sp500Route::from_name("predict").unwrap(),
            Sp500Route::Predict
        );
        assert_eq!(
            Sp500Route::from_name("/predict-sp500").unwrap(),
            Sp500Route::Legacy
        );
        assert_eq!(Sp500Route::from_name("LEGACY").unwrap(), Sp500Route::Legacy);
        assert!(Sp500Route::from_name("sp500").is_err());
        assert_eq!(Sp500Route::Legacy.segments(), &["predict-sp500"]);
    }
}

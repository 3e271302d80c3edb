//! Configuration for the dashboard session

use crate::error::{DashboardError, Result};
use crate::views::ListSource;
use dashboard_api::ApiConfig;
use dashboard_utils::env_string;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable for the directory downloaded chart images go to
pub const ENV_CHART_DIR: &str = "DASHBOARD_CHART_DIR";

/// Hard deadline for Quick Predict requests
pub const QUICK_PREDICT_DEADLINE: Duration = Duration::from_secs(10);

/// Configuration for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Backend client settings
    pub api: ApiConfig,

    /// Collection shown on the home page
    pub list_source: ListSource,

    /// Deadline for Quick Predict lookups
    pub quick_predict_deadline: Duration,

    /// Chart size in terminal cells
    pub chart_width: u16,
    pub chart_height: u16,

    /// Directory for downloaded chart images
    pub chart_dir: PathBuf,

    /// Prompt for the interactive session
    pub prompt: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            list_source: ListSource::default(),
            quick_predict_deadline: QUICK_PREDICT_DEADLINE,
            chart_width: 72,
            chart_height: 16,
            chart_dir: std::env::temp_dir(),
            prompt: "dashboard> ".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration builder
    pub fn builder() -> DashboardConfigBuilder {
        DashboardConfigBuilder::default()
    }

    /// Defaults overlaid with `DASHBOARD_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env()?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;

        if self.quick_predict_deadline.is_zero() {
            return Err(DashboardError::ConfigError(
                "quick_predict_deadline must be greater than 0".to_string(),
            ));
        }

        if let ListSource::Sp500 { limit: 0 } = self.list_source {
            return Err(DashboardError::ConfigError(
                "sp500 limit must be greater than 0".to_string(),
            ));
        }

        if self.chart_dir.as_os_str().is_empty() {
            return Err(DashboardError::ConfigError(
                "chart_dir cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for DashboardConfig
#[derive(Debug, Default)]
pub struct DashboardConfigBuilder {
    api: Option<ApiConfig>,
    list_source: Option<ListSource>,
    quick_predict_deadline: Option<Duration>,
    chart_size: Option<(u16, u16)>,
    chart_dir: Option<PathBuf>,
    prompt: Option<String>,
}

impl DashboardConfigBuilder {
    /// Set the backend client settings
    pub fn api(mut self, config: ApiConfig) -> Self {
        self.api = Some(config);
        self
    }

    /// Set the home page collection
    pub fn list_source(mut self, source: ListSource) -> Self {
        self.list_source = Some(source);
        self
    }

    /// Set the Quick Predict deadline
    pub fn quick_predict_deadline(mut self, deadline: Duration) -> Self {
        self.quick_predict_deadline = Some(deadline);
        self
    }

    /// Set the chart size in terminal cells
    pub fn chart_size(mut self, width: u16, height: u16) -> Self {
        self.chart_size = Some((width, height));
        self
    }

    /// Set the chart image directory
    pub fn chart_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.chart_dir = Some(dir.into());
        self
    }

    /// Set the interactive prompt
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Fill unset fields from the environment
    pub fn with_env(mut self) -> Result<Self> {
        if self.api.is_none() {
            self.api = Some(ApiConfig::from_env()?);
        }

        if self.chart_dir.is_none() {
            self.chart_dir = env_string(ENV_CHART_DIR).map(PathBuf::from);
        }

        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<DashboardConfig> {
        let defaults = DashboardConfig::default();
        let (chart_width, chart_height) = self
            .chart_size
            .unwrap_or((defaults.chart_width, defaults.chart_height));

        let config = DashboardConfig {
            api: self.api.unwrap_or(defaults.api),
            list_source: self.list_source.unwrap_or(defaults.list_source),
            quick_predict_deadline: self
                .quick_predict_deadline
                .unwrap_or(defaults.quick_predict_deadline),
            chart_width,
            chart_height,
            chart_dir: self.chart_dir.unwrap_or(defaults.chart_dir),
            prompt: self.prompt.unwrap_or(defaults.prompt),
        };

        config.validate()?;
        Ok(config)
    }
}

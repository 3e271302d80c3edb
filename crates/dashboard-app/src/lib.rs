//! Terminal dashboard for the stock prediction backend
//!
//! Pages mirror the routes of the dashboard:
//!
//! - `/` lists stocks (or aggregate 60-day forecasts) with a search filter
//! - `/stocks/:ticker` shows price history and an on-demand prediction
//! - `/quarterly-chart/:ticker` shows the 60-day forecast and its chart image
//!
//! plus a Quick Predict panel that looks up one ticker under a 10 second
//! deadline.
//!
//! # Example
//!
//! ```rust,no_run
//! use dashboard_api::PredictionClient;
//! use dashboard_app::{Dashboard, DashboardConfig, Route};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DashboardConfig::from_env()?;
//!     let client = PredictionClient::new(&config.api)?;
//!     let mut dashboard = Dashboard::new(Arc::new(client), config)?;
//!
//!     dashboard.open(Route::parse("/stocks/AAPL")?);
//!     dashboard.settle().await;
//!     println!("{}", dashboard.render());
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod chart;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod render;
pub mod repl;
pub mod route;
pub mod state;
pub mod views;

pub use app::{Dashboard, Outcome, Page, Screen};
pub use chart::{ChartHandle, ChartRenderer, RenderedChart};
pub use commands::Command;
pub use config::{DashboardConfig, DashboardConfigBuilder, QUICK_PREDICT_DEADLINE};
pub use error::{DashboardError, Result};
pub use route::Route;
pub use state::{LoadState, Loadable, RequestId, Resolution};
pub use views::{ListSource, save_chart};

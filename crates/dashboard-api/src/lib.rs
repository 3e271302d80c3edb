//! Typed client for the stock prediction backend
//!
//! The backend is a plain REST service. This crate gives each endpoint a typed
//! function and checks response shapes at the boundary so a malformed payload
//! fails as [`ApiError::MalformedResponse`] instead of surfacing later.
//!
//! - [`PredictionApi`]: the seam the dashboard views depend on
//! - [`PredictionClient`]: the reqwest implementation
//! - [`Endpoints`]: URL construction, also used to show image links
//! - [`with_deadline`]: hard deadline for a single call
//!
//! # Example
//!
//! ```rust,no_run
//! use dashboard_api::{ApiConfig, PredictionApi, PredictionClient, Ticker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PredictionClient::new(&ApiConfig::from_env()?)?;
//!
//!     for stock in client.list_stocks().await? {
//!         println!("{} {:.2}", stock.ticker, stock.price);
//!     }
//!
//!     let history = client.stock_history(&Ticker::parse("aapl")?).await?;
//!     println!("{} points", history.points.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod ticker;

pub use client::{PredictionApi, PredictionClient, with_deadline};
#[cfg(any(test, feature = "mock"))]
pub use client::MockPredictionApi;
pub use config::{ApiConfig, ApiConfigBuilder, DEFAULT_BASE_URL, Sp500Route};
pub use endpoints::{ChartKind, Endpoints};
pub use error::{ApiError, Result};
pub use models::{
    AggregatePrediction, ChartImage, PricePoint, Prediction, QuarterlyPrediction, StockHistory,
    StockSummary,
};
pub use ticker::{Ticker, TickerError};

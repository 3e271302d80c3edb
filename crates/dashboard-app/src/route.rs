//! Navigable routes

use crate::error::{DashboardError, Result};
use dashboard_api::Ticker;
use std::fmt;
use std::str::FromStr;

/// A page of the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`
    Home,
    /// `/stocks/:ticker`
    Stock(Ticker),
    /// `/quarterly-chart/:ticker`
    QuarterlyChart(Ticker),
}

impl Route {
    /// Parse a path such as `/stocks/aapl`
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.trim();
        let segments: Vec<&str> = trimmed
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Ok(Self::Home),
            ["stocks", ticker] => Ok(Self::Stock(Ticker::parse(ticker)?)),
            ["quarterly-chart", ticker] => Ok(Self::QuarterlyChart(Ticker::parse(ticker)?)),
            _ => Err(DashboardError::UnknownRoute(trimmed.to_string())),
        }
    }

    pub fn ticker(&self) -> Option<&Ticker> {
        match self {
            Self::Home => None,
            Self::Stock(ticker) | Self::QuarterlyChart(ticker) => Some(ticker),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => write!(f, "/"),
            Self::Stock(ticker) => write!(f, "/stocks/{ticker}"),
            Self::QuarterlyChart(ticker) => write!(f, "/quarterly-chart/{ticker}"),
        }
    }
}

impl FromStr for Route {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

//! URL construction for every backend endpoint

use crate::config::{ApiConfig, Sp500Route};
use crate::error::Result;
use crate::ticker::Ticker;
use serde::{Deserialize, Serialize};
use url::Url;

/// Which server-rendered chart to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChartKind {
    /// `/predict/quarterly/{symbol}/chart`, shown next to aggregate predictions
    #[default]
    Quarterly,
    /// `/quarterly-predict-plot/{ticker}`, shown on the quarterly chart page
    Plot,
}

impl ChartKind {
    /// Label used in logs and file names
    pub fn label(self) -> &'static str {
        match self {
            Self::Quarterly => "quarterly",
            Self::Plot => "plot",
        }
    }
}

/// Resolves endpoint URLs against the configured base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
    sp500_route: Sp500Route,
}

impl Endpoints {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            base: config.parsed_base_url()?,
            sp500_route: config.sp500_route,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `GET /stocks`
    pub fn stocks(&self) -> Url {
        self.join(&["stocks"])
    }

    /// `GET /stock-history/{ticker}`
    pub fn stock_history(&self, ticker: &Ticker) -> Url {
        self.join(&["stock-history", ticker.as_str()])
    }

    /// `GET /predict/{ticker}`
    pub fn predict(&self, ticker: &Ticker) -> Url {
        self.join(&["predict", ticker.as_str()])
    }

    /// `GET /predict/quarterly/{symbol}`
    pub fn quarterly(&self, symbol: &Ticker) -> Url {
        self.join(&["predict", "quarterly", symbol.as_str()])
    }

    /// `GET /predict/sp500?limit=N` or `GET /predict-sp500?limit=N`
    pub fn sp500(&self, limit: u32) -> Url {
        let mut url = self.join(self.sp500_route.segments());
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        url
    }

    /// Image endpoint for a chart kind
    pub fn chart_image(&self, kind: ChartKind, ticker: &Ticker) -> Url {
        match kind {
            ChartKind::Quarterly => self.join(&["predict", "quarterly", ticker.as_str(), "chart"]),
            ChartKind::Plot => self.join(&["quarterly-predict-plot", ticker.as_str()]),
        }
    }

    fn join(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        // Base URLs are checked to carry a path when the config is validated.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

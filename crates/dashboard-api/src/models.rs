//! Backend payloads and the shape checks applied when decoding them

use crate::error::{ApiError, Result};
use crate::ticker::Ticker;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One entry of the `/stocks` listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSummary {
    pub ticker: Ticker,
    pub name: String,
    pub price: f64,
    pub pe_ratio: f64,
}

/// A labelled price; sequences of these are chronological
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Date (`YYYY-MM-DD`) for history, horizon name ("1 Week") for forecasts
    #[serde(alias = "date")]
    pub label: String,
    pub price: f64,
}

impl PricePoint {
    pub fn new(label: impl Into<String>, price: f64) -> Self {
        Self {
            label: label.into(),
            price,
        }
    }

    /// The label as a calendar date, if it is one
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.label, "%Y-%m-%d").ok()
    }
}

/// Price history of one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockHistory {
    pub ticker: Ticker,
    pub points: Vec<PricePoint>,
}

/// Result of `/predict/{ticker}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Prediction {
    /// Next trading day estimate
    NextClose {
        last_close: f64,
        predicted_next_close: f64,
    },
    /// Today's price plus a forward series over several horizons
    Forecast { today: f64, series: Vec<PricePoint> },
}

impl Prediction {
    /// Price the prediction starts from
    pub fn reference_price(&self) -> f64 {
        match self {
            Self::NextClose { last_close, .. } => *last_close,
            Self::Forecast { today, .. } => *today,
        }
    }

    /// Points worth charting; empty for the next-close shape
    pub fn series(&self) -> &[PricePoint] {
        match self {
            Self::NextClose { .. } => &[],
            Self::Forecast { series, .. } => series,
        }
    }
}

/// 60-day forecast for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatePrediction {
    pub symbol: Ticker,
    pub last_close: f64,
    pub predicted_close_in_60_days: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_mse: Option<f64>,
}

impl AggregatePrediction {
    /// Relative move from last close to the predicted close, in percent
    pub fn expected_change_pct(&self) -> Option<f64> {
        if self.last_close == 0.0 {
            return None;
        }
        let change = self.predicted_close_in_60_days - self.last_close;
        Some(change / self.last_close * 100.0)
    }
}

/// `/predict/quarterly/{symbol}` carries the same fields as an aggregate entry
pub type QuarterlyPrediction = AggregatePrediction;

/// Server-rendered chart image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ChartImage {
    /// File extension matching the content type
    pub fn extension(&self) -> &'static str {
        let subtype = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match subtype.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/svg+xml" => "svg",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "img",
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HistoryPayload {
    Wrapped {
        #[serde(default)]
        ticker: Option<Ticker>,
        history: Vec<PricePoint>,
    },
    Bare(Vec<PricePoint>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PredictionPayload {
    NextClose {
        last_close: f64,
        predicted_next_close: f64,
    },
    Forecast {
        today: f64,
        #[serde(alias = "predictions")]
        all: Vec<PricePoint>,
    },
}

#[derive(Deserialize)]
struct Sp500Payload {
    predictions: Vec<AggregatePrediction>,
}

/// Deserialize a body, turning any serde failure into a shape error
pub(crate) fn decode<T: DeserializeOwned>(endpoint: &str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::malformed(endpoint, e.to_string()))
}

pub(crate) fn decode_stocks(endpoint: &str, body: &[u8]) -> Result<Vec<StockSummary>> {
    let stocks: Vec<StockSummary> = decode(endpoint, body)?;

    let mut seen = HashSet::new();
    for stock in &stocks {
        if !seen.insert(&stock.ticker) {
            return Err(ApiError::malformed(
                endpoint,
                format!("duplicate ticker {}", stock.ticker),
            ));
        }
    }

    Ok(stocks)
}

pub(crate) fn decode_history(
    endpoint: &str,
    requested: &Ticker,
    body: &[u8],
) -> Result<StockHistory> {
    let (ticker, points) = match decode::<HistoryPayload>(endpoint, body)? {
        HistoryPayload::Wrapped { ticker, history } => (ticker, history),
        HistoryPayload::Bare(points) => (None, points),
    };

    if let Some(ticker) = &ticker {
        if ticker != requested {
            return Err(ApiError::malformed(
                endpoint,
                format!("asked for {requested}, got history for {ticker}"),
            ));
        }
    }

    ensure_chronological(endpoint, &points)?;

    Ok(StockHistory {
        ticker: requested.clone(),
        points,
    })
}

pub(crate) fn decode_prediction(endpoint: &str, body: &[u8]) -> Result<Prediction> {
    match decode::<PredictionPayload>(endpoint, body)? {
        PredictionPayload::NextClose {
            last_close,
            predicted_next_close,
        } => Ok(Prediction::NextClose {
            last_close,
            predicted_next_close,
        }),
        PredictionPayload::Forecast { all, .. } if all.is_empty() => {
            Err(ApiError::malformed(endpoint, "forecast series is empty"))
        }
        PredictionPayload::Forecast { today, all } => {
            Ok(Prediction::Forecast { today, series: all })
        }
    }
}

pub(crate) fn decode_sp500(endpoint: &str, body: &[u8]) -> Result<Vec<AggregatePrediction>> {
    let payload: Sp500Payload = decode(endpoint, body)?;

    let mut seen = HashSet::new();
    for prediction in &payload.predictions {
        if !seen.insert(&prediction.symbol) {
            return Err(ApiError::malformed(
                endpoint,
                format!("duplicate symbol {}", prediction.symbol),
            ));
        }
    }

    Ok(payload.predictions)
}

/// Dated labels must never go backwards
fn ensure_chronological(endpoint: &str, points: &[PricePoint]) -> Result<()> {
    let mut previous: Option<NaiveDate> = None;
    for point in points {
        let Some(date) = point.date() else { continue };
        if let Some(before) = previous {
            if date < before {
                return Err(ApiError::malformed(
                    endpoint,
                    format!("history out of order: {date} after {before}"),
                ));
            }
        }
        previous = Some(date);
    }
    Ok(())
}

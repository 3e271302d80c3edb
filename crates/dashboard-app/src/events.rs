//! Completions delivered from background fetches to the views

use crate::error::DashboardError;
use crate::state::RequestId;
use crate::views::{ListEntry, SavedChart};
use dashboard_api::{ApiError, Prediction, QuarterlyPrediction, StockHistory};

type ApiResult<T> = std::result::Result<T, ApiError>;

/// One finished fetch, tagged with the request that started it
#[derive(Debug)]
pub enum ViewEvent {
    /// List page collection
    Listing {
        id: RequestId,
        result: ApiResult<Vec<ListEntry>>,
    },
    /// Detail page history
    History {
        id: RequestId,
        result: ApiResult<StockHistory>,
    },
    /// Detail page prediction
    Prediction {
        id: RequestId,
        result: ApiResult<Prediction>,
    },
    /// Quarterly page numbers
    Quarterly {
        id: RequestId,
        result: ApiResult<QuarterlyPrediction>,
    },
    /// Quarterly page image download
    ChartSaved {
        id: RequestId,
        result: Result<SavedChart, DashboardError>,
    },
    /// Quick Predict lookup
    QuickPredict {
        id: RequestId,
        result: ApiResult<Prediction>,
    },
}

impl ViewEvent {
    pub fn id(&self) -> RequestId {
        match self {
            Self::Listing { id, .. }
            | Self::History { id, .. }
            | Self::Prediction { id, .. }
            | Self::Quarterly { id, .. }
            | Self::ChartSaved { id, .. }
            | Self::QuickPredict { id, .. } => *id,
        }
    }

    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Listing { .. } => "listing",
            Self::History { .. } => "history",
            Self::Prediction { .. } => "prediction",
            Self::Quarterly { .. } => "quarterly",
            Self::ChartSaved { .. } => "chart_saved",
            Self::QuickPredict { .. } => "quick_predict",
        }
    }
}

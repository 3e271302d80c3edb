//! Per-ticker page: price history plus an on-demand prediction

use crate::chart::ChartHandle;
use crate::context::ViewContext;
use crate::events::ViewEvent;
use crate::render::{heading, money};
use crate::route::Route;
use crate::state::{LoadState, Loadable, RequestId, Resolution};
use dashboard_api::{ApiError, Prediction, StockHistory, Ticker};
use tracing::info;

type ApiResult<T> = std::result::Result<T, ApiError>;

/// The `/stocks/:ticker` page
#[derive(Debug)]
pub struct DetailView {
    ticker: Ticker,
    history: Loadable<StockHistory>,
    prediction: Loadable<Prediction>,
    history_chart: ChartHandle,
    prediction_chart: ChartHandle,
}

impl DetailView {
    pub fn new(ticker: Ticker) -> Self {
        Self {
            ticker,
            history: Loadable::new("history"),
            prediction: Loadable::new("prediction"),
            history_chart: ChartHandle::default(),
            prediction_chart: ChartHandle::default(),
        }
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn history(&self) -> &LoadState<StockHistory> {
        self.history.state()
    }

    pub fn prediction(&self) -> &LoadState<Prediction> {
        self.prediction.state()
    }

    pub fn history_chart(&self) -> &ChartHandle {
        &self.history_chart
    }

    pub fn prediction_chart(&self) -> &ChartHandle {
        &self.prediction_chart
    }

    pub fn is_busy(&self) -> bool {
        self.history.is_loading() || self.prediction.is_loading()
    }

    /// Fetch the history for the current ticker
    pub fn mount(&mut self, ctx: &ViewContext) {
        let id = ctx.next_request();
        self.history.begin(id);
        self.history_chart.clear();

        let api = ctx.api();
        let ticker = self.ticker.clone();
        let task = ctx.spawn(async move {
            let result = api.stock_history(&ticker).await;
            ViewEvent::History { id, result }
        });
        self.history.track(id, task);
    }

    /// Switch to another ticker, dropping everything shown for the old one
    pub fn set_ticker(&mut self, ctx: &ViewContext, ticker: Ticker) {
        if ticker == self.ticker {
            return;
        }
        info!(from = %self.ticker, to = %ticker, "detail ticker changed");
        self.ticker = ticker;
        self.prediction.reset();
        self.prediction_chart.clear();
        self.mount(ctx);
    }

    /// Fetch a point prediction; only ever called on user request
    pub fn request_prediction(&mut self, ctx: &ViewContext) {
        let id = ctx.next_request();
        self.prediction.begin(id);

        let api = ctx.api();
        let ticker = self.ticker.clone();
        let task = ctx.spawn(async move {
            let result = api.predict(&ticker).await;
            ViewEvent::Prediction { id, result }
        });
        self.prediction.track(id, task);
    }

    pub fn apply_history(
        &mut self,
        ctx: &ViewContext,
        id: RequestId,
        result: ApiResult<StockHistory>,
    ) -> Resolution {
        let resolution = self.history.resolve(id, result);
        if resolution == Resolution::Stale {
            return resolution;
        }

        match self.history.value() {
            Some(history) => {
                info!(ticker = %self.ticker, points = history.points.len(), "history loaded");
                let title = format!("{} Price History", self.ticker);
                self.history_chart
                    .show(ctx.renderer().line(&title, &history.points));
            }
            None => self.history_chart.clear(),
        }
        resolution
    }

    pub fn apply_prediction(
        &mut self,
        ctx: &ViewContext,
        id: RequestId,
        result: ApiResult<Prediction>,
    ) -> Resolution {
        let resolution = self.prediction.resolve(id, result);
        if resolution == Resolution::Stale {
            return resolution;
        }

        match self.prediction.value() {
            Some(Prediction::Forecast { series, .. }) => {
                let title = format!("{} Forecast", self.ticker);
                self.prediction_chart
                    .show(ctx.renderer().line(&title, series));
            }
            _ => self.prediction_chart.clear(),
        }
        resolution
    }

    pub fn render(&self, _ctx: &ViewContext) -> String {
        let mut out = heading(&format!("Stock Detail: {}", self.ticker));
        out.push('\n');

        match self.history.state() {
            LoadState::Idle => {}
            LoadState::Loading => out.push_str("\nLoading price history..."),
            LoadState::Failed(_) => out.push_str("\nPrice history unavailable."),
            LoadState::Ready(history) if history.points.is_empty() => {
                out.push_str("\nNo price history available.");
            }
            LoadState::Ready(_) => {}
        }
        if let Some(chart) = self.history_chart.current() {
            out.push('\n');
            out.push_str(&chart.to_text());
        }

        match self.prediction.state() {
            LoadState::Loading => out.push_str("\n\nPredicting..."),
            LoadState::Ready(prediction) => {
                out.push_str("\n\nPrediction");
                for line in prediction_lines(&self.ticker, prediction) {
                    out.push_str("\n  ");
                    out.push_str(&line);
                }
                if let Some(chart) = self.prediction_chart.current() {
                    out.push('\n');
                    out.push_str(&chart.to_text());
                }
            }
            LoadState::Idle | LoadState::Failed(_) => {}
        }

        out.push_str("\n\nActions:");
        out.push_str("\n  /predict    Predict Tomorrow's Price");
        out.push_str(&format!(
            "\n  /quarterly  View 60-Day Forecast Chart ({})",
            Route::QuarterlyChart(self.ticker.clone())
        ));
        out
    }
}

/// Summary lines for either prediction shape
pub fn prediction_lines(ticker: &Ticker, prediction: &Prediction) -> Vec<String> {
    match prediction {
        Prediction::NextClose {
            last_close,
            predicted_next_close,
        } => vec![
            format!("Last Close: {}", money(*last_close)),
            format!("Predicted Next Close: {}", money(*predicted_next_close)),
        ],
        Prediction::Forecast { today, .. } => {
            vec![format!("Current price for {ticker}: {}", money(*today))]
        }
    }
}

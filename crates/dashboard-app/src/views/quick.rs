//! Quick Predict: type a ticker, get a price and a forecast chart

use crate::chart::ChartHandle;
use crate::context::ViewContext;
use crate::events::ViewEvent;
use crate::render::{format_error, heading, money};
use crate::state::{Loadable, RequestId, Resolution};
use dashboard_api::{ApiError, Prediction, Ticker, with_deadline};
use tracing::{error, info};

/// Shown when the input is blank
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a valid ticker.";

/// Quick Predict panel
#[derive(Debug)]
pub struct QuickPredictView {
    ticker: Option<Ticker>,
    request: Loadable<()>,
    message: Option<String>,
    failed: bool,
    chart: ChartHandle,
}

impl Default for QuickPredictView {
    fn default() -> Self {
        Self::new()
    }
}

impl QuickPredictView {
    pub fn new() -> Self {
        Self {
            ticker: None,
            request: Loadable::new("quick_predict"),
            message: None,
            failed: false,
            chart: ChartHandle::default(),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Whether the last lookup ended in an error
    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn chart(&self) -> &ChartHandle {
        &self.chart
    }

    pub fn is_busy(&self) -> bool {
        self.request.is_loading()
    }

    /// Look up `input` under the configured deadline
    pub fn submit(&mut self, ctx: &ViewContext, input: &str) {
        if input.trim().is_empty() {
            self.request.reset();
            self.message = Some(EMPTY_INPUT_MESSAGE.to_string());
            self.failed = false;
            return;
        }

        let ticker = match Ticker::parse(input) {
            Ok(ticker) => ticker,
            Err(e) => {
                self.request.reset();
                self.fail(&ApiError::from(e));
                return;
            }
        };

        let id = ctx.next_request();
        self.request.begin(id);
        self.message = Some(format!("Loading prediction for {ticker}..."));
        self.failed = false;
        self.ticker = Some(ticker.clone());

        let api = ctx.api();
        let deadline = ctx.config().quick_predict_deadline;
        let task = ctx.spawn(async move {
            let result = with_deadline(deadline, api.predict(&ticker)).await;
            ViewEvent::QuickPredict { id, result }
        });
        self.request.track(id, task);
    }

    pub fn apply(
        &mut self,
        ctx: &ViewContext,
        id: RequestId,
        result: std::result::Result<Prediction, ApiError>,
    ) -> Resolution {
        let prediction = match result {
            Ok(prediction) => prediction,
            Err(e) => {
                if self.request.resolve(id, Err::<(), _>(&e)) == Resolution::Applied {
                    self.fail(&e);
                    return Resolution::Applied;
                }
                return Resolution::Stale;
            }
        };

        if self.request.resolve::<ApiError>(id, Ok(())) == Resolution::Stale {
            return Resolution::Stale;
        }

        let Some(ticker) = self.ticker.clone() else {
            return Resolution::Applied;
        };
        info!(ticker = %ticker, "quick prediction loaded");

        match &prediction {
            Prediction::Forecast { today, series } => {
                self.message = Some(format!("Current price for {ticker}: {}", money(*today)));
                let title = format!("{ticker} Forecast");
                self.chart.show(ctx.renderer().line(&title, series));
            }
            Prediction::NextClose {
                predicted_next_close,
                ..
            } => {
                self.message = Some(format!(
                    "Predicted price for {ticker}: {}",
                    money(*predicted_next_close)
                ));
                self.chart.clear();
            }
        }
        Resolution::Applied
    }

    fn fail(&mut self, e: &ApiError) {
        error!(error = %e, kind = e.kind(), "quick prediction failed");
        self.message = Some(format_error(&e.to_string()));
        self.failed = true;
        self.chart.clear();
    }

    pub fn render(&self, _ctx: &ViewContext) -> String {
        let mut out = heading("Quick Predict");
        out.push('\n');
        match &self.message {
            Some(message) => {
                out.push('\n');
                out.push_str(message);
            }
            None => out.push_str("\nEnter a ticker with /quick <ticker>"),
        }
        if let Some(chart) = self.chart.current() {
            out.push('\n');
            out.push_str(&chart.to_text());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::testing::{context, forecast};
    use async_trait::async_trait;
    use dashboard_api::{
        AggregatePrediction, ChartImage, ChartKind, MockPredictionApi, PredictionApi,
        QuarterlyPrediction, Result as ApiResult, StockHistory, StockSummary,
    };
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_test::assert_ok;

    /// Answers the first prediction at once, every later one after a minute
    struct SlowAfterFirst {
        answered: AtomicBool,
    }

    #[async_trait]
    impl PredictionApi for SlowAfterFirst {
        async fn list_stocks(&self) -> ApiResult<Vec<StockSummary>> {
            Ok(vec![])
        }

        async fn stock_history(&self, _ticker: &Ticker) -> ApiResult<StockHistory> {
            Err(ApiError::ConfigError("unused".to_string()))
        }

        async fn predict(&self, _ticker: &Ticker) -> ApiResult<Prediction> {
            if self.answered.swap(true, Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            Ok(forecast(150.25, &[150.25, 151.0]))
        }

        async fn quarterly_prediction(&self, _symbol: &Ticker) -> ApiResult<QuarterlyPrediction> {
            Err(ApiError::ConfigError("unused".to_string()))
        }

        async fn sp500_predictions(&self, _limit: u32) -> ApiResult<Vec<AggregatePrediction>> {
            Ok(vec![])
        }

        async fn chart_image(&self, _kind: ChartKind, _ticker: &Ticker) -> ApiResult<ChartImage> {
            Err(ApiError::ConfigError("unused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_request() {
        let (ctx, mut events) = context(MockPredictionApi::new());
        let mut view = QuickPredictView::new();

        view.submit(&ctx, "   ");
        assert_eq!(view.message(), Some("Please enter a valid ticker."));
        assert!(!view.is_busy());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_forecast_shows_price_and_chart() {
        let mut api = MockPredictionApi::new();
        api.expect_predict()
            .withf(|t| t.as_str() == "AAPL")
            .times(1)
            .returning(|_| Ok(forecast(150.25, &[150.25, 151.0, 152.4, 155.0])));
        let (ctx, mut events) = context(api);

        let mut view = QuickPredictView::new();
        view.submit(&ctx, " aapl ");
        assert!(view.is_busy());

        let Some(ViewEvent::QuickPredict { id, result }) = events.recv().await else {
            panic!("expected a quick predict event");
        };
        assert_eq!(view.apply(&ctx, id, result), Resolution::Applied);

        assert_eq!(view.message(), Some("Current price for AAPL: $150.25"));
        assert_eq!(view.chart().current().map(|c| c.point_count()), Some(4));
    }

    #[tokio::test]
    async fn test_next_close_shape() {
        let mut api = MockPredictionApi::new();
        api.expect_predict().returning(|_| {
            Ok(Prediction::NextClose {
                last_close: 100.0,
                predicted_next_close: 101.5,
            })
        });
        let (ctx, mut events) = context(api);

        let mut view = QuickPredictView::new();
        view.submit(&ctx, "MSFT");
        let Some(ViewEvent::QuickPredict { id, result }) = events.recv().await else {
            panic!("expected a quick predict event");
        };
        view.apply(&ctx, id, result);
        assert_eq!(view.message(), Some("Predicted price for MSFT: $101.50"));
        assert!(!view.chart().is_drawn());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_clears_previous_chart() {
        let api = Arc::new(SlowAfterFirst {
            answered: AtomicBool::new(false),
        });
        let (ctx, mut events) = crate::views::testing::context_arc(api);
        let mut view = QuickPredictView::new();

        view.submit(&ctx, "AAPL");
        let Some(ViewEvent::QuickPredict { id, result }) = events.recv().await else {
            panic!("expected a quick predict event");
        };
        view.apply(&ctx, id, result);
        assert!(view.chart().is_drawn());

        // Paused clock: the 10 second deadline fires before the one minute answer
        view.submit(&ctx, "AAPL");
        let Some(ViewEvent::QuickPredict { id, result }) = events.recv().await else {
            panic!("expected a quick predict event");
        };
        assert!(matches!(result, Err(ApiError::Timeout { .. })));
        view.apply(&ctx, id, result);

        let message = view.message().unwrap_or_default();
        assert!(view.failed());
        assert!(message.starts_with("Error: "), "{message}");
        assert!(message.contains("timed out after 10s"));
        assert!(!view.chart().is_drawn());
    }

    #[tokio::test]
    async fn test_invalid_ticker_reports_error() {
        let (ctx, _events) = context(MockPredictionApi::new());
        let mut view = QuickPredictView::new();
        view.submit(&ctx, "$$$");
        let message = view.message().unwrap_or_default();
        assert!(message.starts_with("Error: Invalid ticker"));
    }

    #[tokio::test]
    async fn test_superseded_lookup_is_ignored() {
        let mut api = MockPredictionApi::new();
        api.expect_predict()
            .returning(|t| Ok(forecast(if t.as_str() == "AAPL" { 1.0 } else { 2.0 }, &[1.0])));
        let (ctx, mut events) = context(api);

        let mut view = QuickPredictView::new();
        view.submit(&ctx, "AAPL");
        let Some(first) = view.request.pending_id() else {
            panic!("lookup should be pending");
        };
        view.submit(&ctx, "MSFT");

        let stale = view.apply(&ctx, first, Ok(forecast(1.0, &[1.0])));
        assert_eq!(stale, Resolution::Stale);
        assert_eq!(view.message(), Some("Loading prediction for MSFT..."));

        let event = assert_ok!(timeout(Duration::from_secs(5), events.recv()).await);
        let Some(ViewEvent::QuickPredict { id, result }) = event else {
            panic!("expected a quick predict event");
        };
        view.apply(&ctx, id, result);
        assert_eq!(view.message(), Some("Current price for MSFT: $2.00"));
    }
}

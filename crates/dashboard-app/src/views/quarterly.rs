//! 60-day forecast page with the server-rendered chart

use crate::chart::ChartHandle;
use crate::context::ViewContext;
use crate::error::{DashboardError, Result};
use crate::events::ViewEvent;
use crate::render::{heading, money, percent};
use crate::state::{LoadState, Loadable, RequestId, Resolution};
use dashboard_api::{ApiError, ChartKind, PredictionApi, QuarterlyPrediction, Ticker};
use std::path::{Path, PathBuf};
use tracing::info;

/// A chart image written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedChart {
    pub path: PathBuf,
    pub bytes: usize,
    pub content_type: String,
}

/// Download a chart image into `dir` as `{TICKER}-{kind}.{ext}`
pub async fn save_chart(
    api: &dyn PredictionApi,
    kind: ChartKind,
    ticker: &Ticker,
    dir: &Path,
) -> Result<SavedChart> {
    let image = api.chart_image(kind, ticker).await?;

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!("{ticker}-{}.{}", kind.label(), image.extension()));
    tokio::fs::write(&path, &image.bytes).await?;

    info!(ticker = %ticker, path = %path.display(), bytes = image.bytes.len(), "chart saved");
    Ok(SavedChart {
        path,
        bytes: image.bytes.len(),
        content_type: image.content_type,
    })
}

/// The `/quarterly-chart/:ticker` page
#[derive(Debug)]
pub struct QuarterlyView {
    ticker: Ticker,
    kind: ChartKind,
    forecast: Loadable<QuarterlyPrediction>,
    image: Loadable<SavedChart>,
    link: ChartHandle,
}

impl QuarterlyView {
    pub fn new(ticker: Ticker) -> Self {
        Self {
            ticker,
            kind: ChartKind::Plot,
            forecast: Loadable::new("quarterly"),
            image: Loadable::new("chart_image"),
            link: ChartHandle::default(),
        }
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn forecast(&self) -> &LoadState<QuarterlyPrediction> {
        self.forecast.state()
    }

    pub fn image(&self) -> &LoadState<SavedChart> {
        self.image.state()
    }

    pub fn is_busy(&self) -> bool {
        self.forecast.is_loading() || self.image.is_loading()
    }

    /// Fetch the forecast numbers and download the chart
    pub fn mount(&mut self, ctx: &ViewContext) {
        let url = ctx.endpoints().chart_image(self.kind, &self.ticker);
        let title = format!("{} 60-Day Forecast", self.ticker);
        self.link.show(ctx.renderer().image(&title, &url));

        let id = ctx.next_request();
        self.forecast.begin(id);
        let api = ctx.api();
        let ticker = self.ticker.clone();
        let task = ctx.spawn(async move {
            let result = api.quarterly_prediction(&ticker).await;
            ViewEvent::Quarterly { id, result }
        });
        self.forecast.track(id, task);

        let id = ctx.next_request();
        self.image.begin(id);
        let api = ctx.api();
        let ticker = self.ticker.clone();
        let kind = self.kind;
        let dir = ctx.config().chart_dir.clone();
        let task = ctx.spawn(async move {
            let result = save_chart(api.as_ref(), kind, &ticker, &dir).await;
            ViewEvent::ChartSaved { id, result }
        });
        self.image.track(id, task);
    }

    pub fn apply_forecast(
        &mut self,
        id: RequestId,
        result: std::result::Result<QuarterlyPrediction, ApiError>,
    ) -> Resolution {
        self.forecast.resolve(id, result)
    }

    pub fn apply_image(
        &mut self,
        id: RequestId,
        result: std::result::Result<SavedChart, DashboardError>,
    ) -> Resolution {
        self.image.resolve(id, result)
    }

    pub fn render(&self, _ctx: &ViewContext) -> String {
        let mut out = heading(&format!("Quarterly Prediction: {}", self.ticker));
        out.push('\n');

        match self.forecast.state() {
            LoadState::Idle => {}
            LoadState::Loading => out.push_str("\nLoading forecast..."),
            LoadState::Failed(_) => out.push_str("\nForecast unavailable."),
            LoadState::Ready(forecast) => {
                out.push_str(&format!("\nLast Close: {}", money(forecast.last_close)));
                out.push_str(&format!(
                    "\nPredicted Close (60 days): {}",
                    money(forecast.predicted_close_in_60_days)
                ));
                out.push_str(&format!(
                    "\nExpected Change: {}",
                    percent(forecast.expected_change_pct())
                ));
                if let Some(mse) = forecast.model_mse {
                    out.push_str(&format!("\nModel MSE: {mse:.4}"));
                }
            }
        }

        out.push('\n');
        if let Some(link) = self.link.current() {
            out.push('\n');
            out.push_str(&link.to_text());
        }

        match self.image.state() {
            LoadState::Idle => {}
            LoadState::Loading => out.push_str("\nDownloading chart image..."),
            LoadState::Failed(_) => out.push_str("\nChart image unavailable."),
            LoadState::Ready(saved) => out.push_str(&format!(
                "\nChart saved to {} ({} bytes)",
                saved.path.display(),
                saved.bytes
            )),
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::testing::{aggregate, context_with, ticker};
    use dashboard_api::{ChartImage, MockPredictionApi};

    fn png() -> ChartImage {
        ChartImage {
            content_type: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[tokio::test]
    async fn test_save_chart_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = MockPredictionApi::new();
        api.expect_chart_image()
            .withf(|kind, t| *kind == ChartKind::Quarterly && t.as_str() == "MMM")
            .times(1)
            .returning(|_, _| Ok(png()));

        let target = dir.path().join("charts");
        let saved = save_chart(&api, ChartKind::Quarterly, &ticker("MMM"), &target)
            .await
            .unwrap();

        assert_eq!(saved.path, target.join("MMM-quarterly.png"));
        assert_eq!(saved.bytes, 4);
        assert_eq!(std::fs::read(&saved.path).unwrap(), png().bytes);
    }

    #[tokio::test]
    async fn test_page_loads_forecast_and_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = MockPredictionApi::new();
        api.expect_quarterly_prediction()
            .times(1)
            .returning(|t| Ok(aggregate(t.as_str(), 100.0, 110.0)));
        api.expect_chart_image()
            .withf(|kind, _| *kind == ChartKind::Plot)
            .times(1)
            .returning(|_, _| Ok(png()));
        let (ctx, mut events) = context_with(api, dir.path());

        let mut view = QuarterlyView::new(ticker("MMM"));
        view.mount(&ctx);
        assert!(view.is_busy());

        while view.is_busy() {
            match events.recv().await {
                Some(ViewEvent::Quarterly { id, result }) => {
                    view.apply_forecast(id, result);
                }
                Some(ViewEvent::ChartSaved { id, result }) => {
                    view.apply_image(id, result);
                }
                other => panic!("unexpected event {other:?}"),
            }
        }

        let text = view.render(&ctx);
        assert!(text.contains("Predicted Close (60 days): $110.00"));
        assert!(text.contains("+10.00%"));
        assert!(text.contains("/quarterly-predict-plot/MMM"));
        assert!(text.contains("MMM-plot.png"));
        assert!(dir.path().join("MMM-plot.png").exists());
    }

    #[tokio::test]
    async fn test_image_failure_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = MockPredictionApi::new();
        api.expect_quarterly_prediction().returning(|_| {
            Err(ApiError::Http {
                status: 500,
                url: "http://localhost:8000/predict/quarterly/MMM".to_string(),
            })
        });
        api.expect_chart_image().returning(|_, _| {
            Err(ApiError::malformed("quarterly-predict-plot", "expected image/*"))
        });
        let (ctx, mut events) = context_with(api, dir.path());

        let mut view = QuarterlyView::new(ticker("MMM"));
        view.mount(&ctx);
        while view.is_busy() {
            match events.recv().await {
                Some(ViewEvent::Quarterly { id, result }) => {
                    view.apply_forecast(id, result);
                }
                Some(ViewEvent::ChartSaved { id, result }) => {
                    view.apply_image(id, result);
                }
                other => panic!("unexpected event {other:?}"),
            }
        }

        let text = view.render(&ctx);
        assert!(text.contains("Forecast unavailable."));
        assert!(text.contains("Chart image unavailable."));
        assert!(text.contains("Chart image: "));
    }
}

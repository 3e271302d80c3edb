//! HTTP client for the prediction backend

use crate::config::ApiConfig;
use crate::endpoints::{ChartKind, Endpoints};
use crate::error::{ApiError, Result};
use crate::models::{
    self, AggregatePrediction, ChartImage, Prediction, QuarterlyPrediction, StockHistory,
    StockSummary,
};
use crate::ticker::Ticker;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Operations the dashboard needs from the backend.
///
/// Every call issues exactly one request. Nothing is retried or cached.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait PredictionApi: Send + Sync {
    /// `GET /stocks`
    async fn list_stocks(&self) -> Result<Vec<StockSummary>>;

    /// `GET /stock-history/{ticker}`
    async fn stock_history(&self, ticker: &Ticker) -> Result<StockHistory>;

    /// `GET /predict/{ticker}`
    async fn predict(&self, ticker: &Ticker) -> Result<Prediction>;

    /// `GET /predict/quarterly/{symbol}`
    async fn quarterly_prediction(&self, symbol: &Ticker) -> Result<QuarterlyPrediction>;

    /// Aggregate predictions, at most `limit` entries
    async fn sp500_predictions(&self, limit: u32) -> Result<Vec<AggregatePrediction>>;

    /// Download a server-rendered chart
    async fn chart_image(&self, kind: ChartKind, ticker: &Ticker) -> Result<ChartImage>;
}

/// Run a call under a hard deadline, reporting overruns as [`ApiError::Timeout`]
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::Timeout { after: deadline }),
    }
}

/// reqwest-backed [`PredictionApi`]
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: Client,
    endpoints: Endpoints,
    request_timeout: Duration,
}

impl PredictionClient {
    /// Create a client from a validated configuration
    pub fn new(config: &ApiConfig) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ApiError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoints: Endpoints::new(config)?,
            request_timeout: config.request_timeout,
        })
    }

    /// Create from `DASHBOARD_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(&ApiConfig::from_env()?)
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn get(&self, endpoint: &str, url: &Url) -> Result<reqwest::Response> {
        debug!(endpoint, %url, "GET");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ApiError::from_transport(url.as_str(), &e, self.request_timeout))?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint, %url, status = status.as_u16(), "backend returned an error status");
            return Err(ApiError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    async fn get_body(&self, endpoint: &str, url: &Url) -> Result<(Option<String>, Vec<u8>)> {
        let response = self.get(endpoint, url).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_transport(url.as_str(), &e, self.request_timeout))?;

        debug!(endpoint, bytes = body.len(), "response received");
        Ok((content_type, body.to_vec()))
    }
}

#[async_trait]
impl PredictionApi for PredictionClient {
    #[instrument(skip(self))]
    async fn list_stocks(&self) -> Result<Vec<StockSummary>> {
        let (_, body) = self.get_body("stocks", &self.endpoints.stocks()).await?;
        models::decode_stocks("stocks", &body)
    }

    #[instrument(skip_all, fields(ticker = %ticker))]
    async fn stock_history(&self, ticker: &Ticker) -> Result<StockHistory> {
        let url = self.endpoints.stock_history(ticker);
        let (_, body) = self.get_body("stock-history", &url).await?;
        models::decode_history("stock-history", ticker, &body)
    }

    #[instrument(skip_all, fields(ticker = %ticker))]
    async fn predict(&self, ticker: &Ticker) -> Result<Prediction> {
        let url = self.endpoints.predict(ticker);
        let (_, body) = self.get_body("predict", &url).await?;
        models::decode_prediction("predict", &body)
    }

    #[instrument(skip_all, fields(symbol = %symbol))]
    async fn quarterly_prediction(&self, symbol: &Ticker) -> Result<QuarterlyPrediction> {
        let url = self.endpoints.quarterly(symbol);
        let (_, body) = self.get_body("predict/quarterly", &url).await?;
        models::decode("predict/quarterly", &body)
    }

    #[instrument(skip(self))]
    async fn sp500_predictions(&self, limit: u32) -> Result<Vec<AggregatePrediction>> {
        let (_, body) = self.get_body("sp500", &self.endpoints.sp500(limit)).await?;
        models::decode_sp500("sp500", &body)
    }

    #[instrument(skip_all, fields(kind = kind.label(), ticker = %ticker))]
    async fn chart_image(&self, kind: ChartKind, ticker: &Ticker) -> Result<ChartImage> {
        let url = self.endpoints.chart_image(kind, ticker);
        let (content_type, bytes) = self.get_body("chart", &url).await?;

        let content_type = content_type.unwrap_or_default();
        let mime = content_type.trim().to_ascii_lowercase();
        if !mime.starts_with("image/") {
            return Err(ApiError::malformed(
                "chart",
                format!("expected an image, got content type '{content_type}'"),
            ));
        }
        if bytes.is_empty() {
            return Err(ApiError::malformed("chart", "empty image body"));
        }

        Ok(ChartImage {
            content_type,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Sp500Route;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio_test::{assert_err, assert_ok};

    /// Answer a single request with a canned response; yields the request line
    async fn serve_once(
        status: &'static str,
        content_type: &'static str,
        body: Vec<u8>,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]);
            let request_line = request.lines().next().unwrap_or_default().to_string();
            let _ = tx.send(request_line);

            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            let _ = socket.shutdown().await;
        });

        (format!("http://{addr}"), rx)
    }

    fn client(base: &str) -> PredictionClient {
        let config = ApiConfig::builder()
            .base_url(base)
            .request_timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        PredictionClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_list_stocks_over_http() {
        let body = br#"[{"name": "Apple Inc.", "ticker": "AAPL", "price": 210.12, "pe_ratio": 28.4}]"#;
        let (base, request) = serve_once("200 OK", "application/json", body.to_vec()).await;

        let stocks = assert_ok!(client(&base).list_stocks().await);
        assert_eq!(stocks.len(), 1);
        assert_eq!(stocks[0].name, "Apple Inc.");
        assert_eq!(request.await.unwrap(), "GET /stocks HTTP/1.1");
    }

    #[tokio::test]
    async fn test_sp500_uses_limit_query() {
        let body = br#"{"predictions": []}"#;
        let (base, request) = serve_once("200 OK", "application/json", body.to_vec()).await;

        let predictions = assert_ok!(client(&base).sp500_predictions(20).await);
        assert!(predictions.is_empty());
        assert_eq!(
            request.await.unwrap(),
            "GET /predict/sp500?limit=20 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_error() {
        let (base, _request) = serve_once(
            "500 Internal Server Error",
            "application/json",
            b"{}".to_vec(),
        )
        .await;

        let err = assert_err!(client(&base).list_stocks().await);
        assert!(matches!(err, ApiError::Http { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_reported() {
        let (base, _request) = serve_once("200 OK", "text/html", b"<html>".to_vec()).await;

        let err = assert_err!(client(&base).list_stocks().await);
        assert!(matches!(err, ApiError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_chart_image_requires_image_content_type() {
        let (base, _request) = serve_once("200 OK", "application/json", b"{}".to_vec()).await;
        let aapl = Ticker::parse("AAPL").unwrap();

        let err = assert_err!(client(&base).chart_image(ChartKind::Plot, &aapl).await);
        assert!(matches!(err, ApiError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_chart_image_download() {
        let png = vec![0x89, b'P', b'N', b'G'];
        let (base, request) = serve_once("200 OK", "image/png", png.clone()).await;
        let aapl = Ticker::parse("aapl").unwrap();

        let image = assert_ok!(client(&base).chart_image(ChartKind::Quarterly, &aapl).await);
        assert_eq!(image.bytes, png);
        assert_eq!(image.extension(), "png");
        assert_eq!(
            request.await.unwrap(),
            "GET /predict/quarterly/AAPL/chart HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = assert_err!(client(&format!("http://{addr}")).list_stocks().await);
        assert!(matches!(err, ApiError::Network { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_transport_timeout_is_timeout_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let config = ApiConfig::builder()
            .base_url(format!("http://{addr}"))
            .request_timeout(Duration::from_millis(200))
            .sp500_route(Sp500Route::Predict)
            .build()
            .unwrap();
        let client = PredictionClient::new(&config).unwrap();

        let err = assert_err!(client.list_stocks().await);
        assert!(matches!(err, ApiError::Timeout { .. }), "got {err:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_deadline_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, ApiError>(1)
        };

        let err = assert_err!(with_deadline(Duration::from_secs(10), slow).await);
        assert!(matches!(err, ApiError::Timeout { after } if after == Duration::from_secs(10)));
    }

    #[tokio::test]
    async fn test_with_deadline_passes_through() {
        let fast = async { Ok::<_, ApiError>(7) };
        let value = assert_ok!(with_deadline(Duration::from_secs(10), fast).await);
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_mock_api() {
        let mut api = MockPredictionApi::new();
        api.expect_list_stocks().times(1).returning(|| Ok(vec![]));

        let stocks = api.list_stocks().await.unwrap();
        assert!(stocks.is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires a running backend on localhost:8000
    async fn test_live_backend_stocks() {
        let client = PredictionClient::new(&ApiConfig::default()).unwrap();
        let stocks = client.list_stocks().await.unwrap();
        assert!(!stocks.is_empty());
    }
}

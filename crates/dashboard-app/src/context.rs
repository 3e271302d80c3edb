//! What views need to start fetches and report back

use crate::chart::ChartRenderer;
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::events::ViewEvent;
use crate::state::RequestId;
use dashboard_api::{Endpoints, PredictionApi};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::debug;

/// Shared by all views of a session.
///
/// Fetches run as tokio tasks and send their outcome back as a [`ViewEvent`];
/// views never await the backend themselves.
pub struct ViewContext {
    api: Arc<dyn PredictionApi>,
    endpoints: Endpoints,
    config: DashboardConfig,
    renderer: ChartRenderer,
    events: mpsc::UnboundedSender<ViewEvent>,
    next_id: AtomicU64,
}

impl ViewContext {
    /// Context plus the receiving end of its event channel
    pub fn new(
        api: Arc<dyn PredictionApi>,
        config: DashboardConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ViewEvent>)> {
        let endpoints = Endpoints::new(&config.api)?;
        let renderer = ChartRenderer::new(config.chart_width, config.chart_height);
        let (events, receiver) = mpsc::unbounded_channel();

        let context = Self {
            api,
            endpoints,
            config,
            renderer,
            events,
            next_id: AtomicU64::new(1),
        };
        Ok((context, receiver))
    }

    pub fn api(&self) -> Arc<dyn PredictionApi> {
        Arc::clone(&self.api)
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn renderer(&self) -> &ChartRenderer {
        &self.renderer
    }

    /// Fresh id, never reused within the session
    pub fn next_request(&self) -> RequestId {
        RequestId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Run `fetch` in the background and deliver its event.
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn<F>(&self, fetch: F) -> AbortHandle
    where
        F: Future<Output = ViewEvent> + Send + 'static,
    {
        let events = self.events.clone();
        tokio::spawn(async move {
            let event = fetch.await;
            if events.send(event).is_err() {
                debug!("session closed before the response arrived");
            }
        })
        .abort_handle()
    }
}

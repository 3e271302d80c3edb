//! The dashboard session: one mounted page, navigation, and event dispatch

use crate::commands::Command;
use crate::config::DashboardConfig;
use crate::context::ViewContext;
use crate::error::{DashboardError, Result};
use crate::events::ViewEvent;
use crate::route::Route;
use crate::state::{LoadState, Resolution};
use crate::views::{
    DEFAULT_SP500_LIMIT, DetailView, ListSource, ListView, QuarterlyView, QuickPredictView,
};
use dashboard_api::{PredictionApi, Ticker};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Something that can be shown: a route, or the Quick Predict panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Route(Route),
    QuickPredict,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Route(route) => write!(f, "{route}"),
            Self::QuickPredict => write!(f, "quick-predict"),
        }
    }
}

impl From<Route> for Page {
    fn from(route: Route) -> Self {
        Self::Route(route)
    }
}

/// The mounted view
#[derive(Debug)]
pub enum Screen {
    List(ListView),
    Detail(DetailView),
    Quarterly(QuarterlyView),
    Quick(QuickPredictView),
}

impl Screen {
    fn is_busy(&self) -> bool {
        match self {
            Self::List(view) => view.is_loading(),
            Self::Detail(view) => view.is_busy(),
            Self::Quarterly(view) => view.is_busy(),
            Self::Quick(view) => view.is_busy(),
        }
    }
}

/// What the caller should print after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The page changed; print [`Dashboard::render`]
    Render,
    /// Print [`Command::help_text`]
    Help,
    Exit,
}

/// An interactive dashboard session.
///
/// Must be driven inside a tokio runtime: mounting a page spawns its fetches.
pub struct Dashboard {
    ctx: ViewContext,
    events: mpsc::UnboundedReceiver<ViewEvent>,
    source: ListSource,
    page: Option<Page>,
    screen: Option<Screen>,
    back_stack: Vec<Page>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn PredictionApi>, config: DashboardConfig) -> Result<Self> {
        let source = config.list_source;
        let (ctx, events) = ViewContext::new(api, config)?;
        Ok(Self {
            ctx,
            events,
            source,
            page: None,
            screen: None,
            back_stack: Vec::new(),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        self.ctx.config()
    }

    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    pub fn screen(&self) -> Option<&Screen> {
        self.screen.as_ref()
    }

    pub fn list_source(&self) -> ListSource {
        self.source
    }

    /// Navigate to `page`, remembering the current one for `/back`
    pub fn open(&mut self, page: impl Into<Page>) {
        let page = page.into();
        if let Some(current) = self.page.take() {
            if current != page {
                self.back_stack.push(current);
            }
        }
        self.mount(page, false);
    }

    fn mount(&mut self, page: Page, force: bool) {
        if !force {
            if let (Some(Screen::Detail(view)), Page::Route(Route::Stock(ticker))) =
                (&mut self.screen, &page)
            {
                view.set_ticker(&self.ctx, ticker.clone());
                self.page = Some(page);
                return;
            }
        }

        // Dropping the old view aborts whatever it still had in flight
        self.screen = None;

        let screen = match &page {
            Page::Route(Route::Home) => {
                let mut view = ListView::new(self.source);
                view.mount(&self.ctx);
                Screen::List(view)
            }
            Page::Route(Route::Stock(ticker)) => {
                let mut view = DetailView::new(ticker.clone());
                view.mount(&self.ctx);
                Screen::Detail(view)
            }
            Page::Route(Route::QuarterlyChart(ticker)) => {
                let mut view = QuarterlyView::new(ticker.clone());
                view.mount(&self.ctx);
                Screen::Quarterly(view)
            }
            Page::QuickPredict => Screen::Quick(QuickPredictView::new()),
        };

        info!(page = %page, "page opened");
        self.screen = Some(screen);
        self.page = Some(page);
    }

    /// Run one command
    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        debug!(command = command.description(), "executing command");

        match command {
            Command::Home => self.open(Route::Home),
            Command::Search { text } => self.list_mut()?.set_search(text),
            Command::ClearSearch => self.list_mut()?.set_search(""),
            Command::Open { selector } => {
                let route = self.list()?.select(&selector)?;
                self.open(route);
            }
            Command::Go { path } => self.open(Route::parse(&path)?),
            Command::Predict => match &mut self.screen {
                Some(Screen::Detail(view)) => view.request_prediction(&self.ctx),
                _ => {
                    return Err(DashboardError::CommandError(
                        "/predict is only available on a stock page".to_string(),
                    ));
                }
            },
            Command::Quarterly { ticker } => {
                let ticker = match ticker {
                    Some(ticker) => ticker,
                    None => self.current_ticker().cloned().ok_or_else(|| {
                        DashboardError::CommandError(
                            "No stock selected, use /quarterly <ticker>".to_string(),
                        )
                    })?,
                };
                self.open(Route::QuarterlyChart(ticker));
            }
            Command::Stocks => self.switch_source(ListSource::Stocks),
            Command::Sp500 { limit } => self.switch_source(ListSource::Sp500 {
                limit: limit.unwrap_or(DEFAULT_SP500_LIMIT),
            }),
            Command::Quick { input } => {
                if self.page != Some(Page::QuickPredict) {
                    self.open(Page::QuickPredict);
                }
                if let Some(Screen::Quick(view)) = &mut self.screen {
                    view.submit(&self.ctx, &input);
                }
            }
            Command::Refresh => {
                let page = self.page.clone().unwrap_or(Page::Route(Route::Home));
                self.mount(page, true);
            }
            Command::Back => {
                let page = self.back_stack.pop().ok_or_else(|| {
                    DashboardError::CommandError("No previous page".to_string())
                })?;
                self.mount(page, false);
            }
            Command::Help => return Ok(Outcome::Help),
            Command::Exit => return Ok(Outcome::Exit),
        }

        Ok(Outcome::Render)
    }

    fn switch_source(&mut self, source: ListSource) {
        info!(source = source.label(), "list source changed");
        self.source = source;
        if self.page == Some(Page::Route(Route::Home)) {
            self.mount(Page::Route(Route::Home), true);
        } else {
            self.open(Route::Home);
        }
    }

    fn current_ticker(&self) -> Option<&Ticker> {
        match self.page.as_ref()? {
            Page::Route(route) => route.ticker(),
            Page::QuickPredict => None,
        }
    }

    fn list(&self) -> Result<&ListView> {
        match &self.screen {
            Some(Screen::List(view)) => Ok(view),
            _ => Err(not_on_list()),
        }
    }

    fn list_mut(&mut self) -> Result<&mut ListView> {
        match &mut self.screen {
            Some(Screen::List(view)) => Ok(view),
            _ => Err(not_on_list()),
        }
    }

    /// Wait for the next completed fetch
    pub async fn next_event(&mut self) -> Option<ViewEvent> {
        self.events.recv().await
    }

    /// Hand a completion to the mounted view; true when something changed
    pub fn apply(&mut self, event: ViewEvent) -> bool {
        let ctx = &self.ctx;
        let resolution = match (&mut self.screen, event) {
            (Some(Screen::List(view)), ViewEvent::Listing { id, result }) => view.apply(id, result),
            (Some(Screen::Detail(view)), ViewEvent::History { id, result }) => {
                view.apply_history(ctx, id, result)
            }
            (Some(Screen::Detail(view)), ViewEvent::Prediction { id, result }) => {
                view.apply_prediction(ctx, id, result)
            }
            (Some(Screen::Quarterly(view)), ViewEvent::Quarterly { id, result }) => {
                view.apply_forecast(id, result)
            }
            (Some(Screen::Quarterly(view)), ViewEvent::ChartSaved { id, result }) => {
                view.apply_image(id, result)
            }
            (Some(Screen::Quick(view)), ViewEvent::QuickPredict { id, result }) => {
                view.apply(ctx, id, result)
            }
            (_, event) => {
                debug!(kind = event.kind(), request = %event.id(), "no view waiting for response");
                Resolution::Stale
            }
        };
        resolution == Resolution::Applied
    }

    /// Whether the mounted view still waits for a fetch
    pub fn is_busy(&self) -> bool {
        self.screen.as_ref().is_some_and(Screen::is_busy)
    }

    /// Apply events until the mounted view has nothing in flight
    pub async fn settle(&mut self) {
        while self.is_busy() {
            match self.next_event().await {
                Some(event) => {
                    self.apply(event);
                }
                None => break,
            }
        }
    }

    /// First failure shown on the mounted view
    pub fn failure(&self) -> Option<String> {
        fn failed<T>(state: &LoadState<T>) -> Option<String> {
            match state {
                LoadState::Failed(message) => Some(message.clone()),
                _ => None,
            }
        }

        match self.screen.as_ref()? {
            Screen::List(view) => failed(view.state()),
            Screen::Detail(view) => failed(view.history()).or_else(|| failed(view.prediction())),
            Screen::Quarterly(view) => failed(view.forecast()).or_else(|| failed(view.image())),
            Screen::Quick(view) if view.failed() => view.message().map(str::to_string),
            Screen::Quick(_) => None,
        }
    }

    pub fn render(&self) -> String {
        match &self.screen {
            Some(Screen::List(view)) => view.render(&self.ctx),
            Some(Screen::Detail(view)) => view.render(&self.ctx),
            Some(Screen::Quarterly(view)) => view.render(&self.ctx),
            Some(Screen::Quick(view)) => view.render(&self.ctx),
            None => "Nothing to show. Type /help for commands.".to_string(),
        }
    }
}

fn not_on_list() -> DashboardError {
    DashboardError::CommandError("Only available on the list page, use /home".to_string())
}

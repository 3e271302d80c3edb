//! Home page listing stocks or aggregate forecasts, with search

use crate::context::ViewContext;
use crate::error::{DashboardError, Result};
use crate::events::ViewEvent;
use crate::render::{heading, money, numeric, percent, table};
use crate::route::Route;
use crate::state::{LoadState, Loadable, RequestId, Resolution};
use comfy_table::Cell;
use dashboard_api::{AggregatePrediction, ApiError, ChartKind, StockSummary, Ticker};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Aggregate forecasts requested when no limit is given
pub const DEFAULT_SP500_LIMIT: u32 = 20;

/// Which collection the home page lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ListSource {
    /// `/stocks`; entries open the detail page
    #[default]
    Stocks,
    /// Aggregate 60-day forecasts; entries open the quarterly chart page
    Sp500 { limit: u32 },
}

impl ListSource {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Stocks => "Stock Predictions",
            Self::Sp500 { .. } => "S&P 500 60-Day Forecasts",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Stocks => "stocks",
            Self::Sp500 { .. } => "sp500",
        }
    }
}

/// One row of the listing
#[derive(Debug, Clone, PartialEq)]
pub enum ListEntry {
    Stock(StockSummary),
    Forecast(AggregatePrediction),
}

impl ListEntry {
    pub fn ticker(&self) -> &Ticker {
        match self {
            Self::Stock(stock) => &stock.ticker,
            Self::Forecast(forecast) => &forecast.symbol,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Stock(stock) => Some(&stock.name),
            Self::Forecast(_) => None,
        }
    }

    /// Page the entry opens
    pub fn route(&self) -> Route {
        match self {
            Self::Stock(stock) => Route::Stock(stock.ticker.clone()),
            Self::Forecast(forecast) => Route::QuarterlyChart(forecast.symbol.clone()),
        }
    }

    /// `needle` must already be lowercase
    fn matches(&self, needle: &str) -> bool {
        self.ticker().as_str().to_lowercase().contains(needle)
            || self
                .name()
                .is_some_and(|name| name.to_lowercase().contains(needle))
    }
}

/// Entries whose name or ticker contains `search`, ignoring case.
///
/// An empty search keeps everything; order is preserved.
pub fn filter_entries<'a>(entries: &'a [ListEntry], search: &str) -> Vec<&'a ListEntry> {
    let needle = search.to_lowercase();
    entries
        .iter()
        .filter(|entry| entry.matches(&needle))
        .collect()
}

/// The home page
#[derive(Debug)]
pub struct ListView {
    source: ListSource,
    entries: Loadable<Vec<ListEntry>>,
    search: String,
}

impl ListView {
    pub fn new(source: ListSource) -> Self {
        Self {
            source,
            entries: Loadable::new("list"),
            search: String::new(),
        }
    }

    pub fn source(&self) -> ListSource {
        self.source
    }

    pub fn state(&self) -> &LoadState<Vec<ListEntry>> {
        self.entries.state()
    }

    pub fn is_loading(&self) -> bool {
        self.entries.is_loading()
    }

    /// Issue the single fetch for the collection
    pub fn mount(&mut self, ctx: &ViewContext) {
        let id = ctx.next_request();
        self.entries.begin(id);

        let api = ctx.api();
        let task = match self.source {
            ListSource::Stocks => ctx.spawn(async move {
                let result = api
                    .list_stocks()
                    .await
                    .map(|stocks| stocks.into_iter().map(ListEntry::Stock).collect());
                ViewEvent::Listing { id, result }
            }),
            ListSource::Sp500 { limit } => ctx.spawn(async move {
                let result = api
                    .sp500_predictions(limit)
                    .await
                    .map(|forecasts| forecasts.into_iter().map(ListEntry::Forecast).collect());
                ViewEvent::Listing { id, result }
            }),
        };
        self.entries.track(id, task);
    }

    pub fn apply(
        &mut self,
        id: RequestId,
        result: std::result::Result<Vec<ListEntry>, ApiError>,
    ) -> Resolution {
        let count = result.as_ref().map(Vec::len).ok();
        let resolution = self.entries.resolve(id, result);
        if let (Resolution::Applied, Some(count)) = (resolution, count) {
            info!(source = self.source.label(), count, "list loaded");
        }
        resolution
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    /// Entries passing the current search; empty until loaded
    pub fn visible(&self) -> Vec<&ListEntry> {
        match self.entries.value() {
            Some(entries) => filter_entries(entries, &self.search),
            None => Vec::new(),
        }
    }

    /// Route for a visible entry, chosen by its 1-based number or its ticker
    pub fn select(&self, selector: &str) -> Result<Route> {
        let selector = selector.trim();
        let visible = self.visible();

        if let Ok(number) = selector.parse::<usize>() {
            return number
                .checked_sub(1)
                .and_then(|index| visible.get(index))
                .map(|entry| entry.route())
                .ok_or_else(|| {
                    DashboardError::Selection(format!(
                        "no entry #{number}, {} shown",
                        visible.len()
                    ))
                });
        }

        let ticker = Ticker::parse(selector)?;
        visible
            .iter()
            .find(|entry| entry.ticker() == &ticker)
            .map(|entry| entry.route())
            .ok_or_else(|| {
                DashboardError::Selection(format!(
                    "{ticker} is not in the list, use /go /stocks/{ticker}"
                ))
            })
    }

    pub fn render(&self, ctx: &ViewContext) -> String {
        let mut out = heading(self.source.title());
        out.push('\n');

        let entries = match self.entries.state() {
            LoadState::Idle | LoadState::Loading => {
                out.push_str("\nLoading...");
                return out;
            }
            LoadState::Failed(message) => {
                out.push_str(&format!("\nCould not load the list: {message}"));
                out.push_str("\nNo entries to show.");
                return out;
            }
            LoadState::Ready(entries) => entries,
        };

        let visible = filter_entries(entries, &self.search);
        if !self.search.is_empty() {
            out.push_str(&format!(
                "\nSearch: \"{}\" ({} of {})",
                self.search,
                visible.len(),
                entries.len()
            ));
        }

        if visible.is_empty() {
            out.push_str("\nNo entries to show.");
            return out;
        }

        let table = match self.source {
            ListSource::Stocks => stocks_table(&visible),
            ListSource::Sp500 { .. } => forecasts_table(&visible, ctx),
        };
        out.push('\n');
        out.push_str(&table.to_string());
        out.push_str("\nOpen an entry with /open <#|ticker>");
        out
    }
}

fn stocks_table(entries: &[&ListEntry]) -> comfy_table::Table {
    let mut table = table(&["#", "Ticker", "Name", "Price", "P/E Ratio"]);
    for (index, entry) in entries.iter().enumerate() {
        if let ListEntry::Stock(stock) = entry {
            table.add_row(vec![
                numeric(index + 1),
                Cell::new(&stock.ticker),
                Cell::new(&stock.name),
                numeric(money(stock.price)),
                numeric(format!("{:.2}", stock.pe_ratio)),
            ]);
        }
    }
    table
}

fn forecasts_table(entries: &[&ListEntry], ctx: &ViewContext) -> comfy_table::Table {
    let mut table = table(&["#", "Symbol", "Last Close", "Predicted (60d)", "Change", "Chart"]);
    for (index, entry) in entries.iter().enumerate() {
        if let ListEntry::Forecast(forecast) = entry {
            let chart = ctx
                .endpoints()
                .chart_image(ChartKind::Quarterly, &forecast.symbol);
            table.add_row(vec![
                numeric(index + 1),
                Cell::new(&forecast.symbol),
                numeric(money(forecast.last_close)),
                numeric(money(forecast.predicted_close_in_60_days)),
                numeric(percent(forecast.expected_change_pct())),
                Cell::new(chart),
            ]);
        }
    }
    table
}

//! Line charts drawn as terminal text
//!
//! Charts are rendered with ratatui into an off-screen buffer and kept as
//! plain lines, so views can print them and tests can inspect them.

use dashboard_api::PricePoint;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::{Axis, Block, Chart, Dataset, GraphType, Widget};
use tracing::debug;
use url::Url;

/// Text shown instead of a chart when there is nothing to plot
pub const NO_DATA: &str = "No data";

/// A chart ready to print
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    title: String,
    points: usize,
    lines: Vec<String>,
}

impl RenderedChart {
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of plotted points
    pub fn point_count(&self) -> usize {
        self.points
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Draws price series at a fixed size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartRenderer {
    width: u16,
    height: u16,
}

impl ChartRenderer {
    /// Smallest area that still fits a bordered chart with axes
    pub const MIN_WIDTH: u16 = 20;
    pub const MIN_HEIGHT: u16 = 6;

    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: width.max(Self::MIN_WIDTH),
            height: height.max(Self::MIN_HEIGHT),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Line chart of `points` in order; an empty series gives [`NO_DATA`]
    pub fn line(&self, title: &str, points: &[PricePoint]) -> RenderedChart {
        if points.is_empty() {
            return RenderedChart {
                title: title.to_string(),
                points: 0,
                lines: vec![title.to_string(), NO_DATA.to_string()],
            };
        }

        let data: Vec<(f64, f64)> = points
            .iter()
            .enumerate()
            .map(|(i, point)| (i as f64, point.price))
            .collect();
        let (low, high) = price_bounds(points);
        let x_max = points.len().saturating_sub(1).max(1) as f64;
        let first = points.first().map(|p| p.label.clone()).unwrap_or_default();
        let last = points.last().map(|p| p.label.clone()).unwrap_or_default();

        let dataset = Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&data);

        let chart = Chart::new(vec![dataset])
            .block(Block::bordered().title(title.to_string()))
            .legend_position(None)
            .x_axis(
                Axis::default()
                    .bounds([0.0, x_max])
                    .labels(vec![first, last]),
            )
            .y_axis(
                Axis::default()
                    .bounds([low, high])
                    .labels(vec![format!("{low:.2}"), format!("{high:.2}")]),
            );

        let area = Rect::new(0, 0, self.width, self.height);
        let mut buffer = Buffer::empty(area);
        chart.render(area, &mut buffer);

        debug!(title, points = points.len(), "chart rendered");
        RenderedChart {
            title: title.to_string(),
            points: points.len(),
            lines: buffer_lines(&buffer, area),
        }
    }

    /// Reference to a chart the backend renders itself
    pub fn image(&self, title: &str, url: &Url) -> RenderedChart {
        RenderedChart {
            title: title.to_string(),
            points: 0,
            lines: vec![title.to_string(), format!("Chart image: {url}")],
        }
    }
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(72, 16)
    }
}

/// The chart a component currently shows.
///
/// Owned by the component; replacing or clearing it drops the old chart, and
/// dropping the component drops whatever was drawn.
#[derive(Debug, Default)]
pub struct ChartHandle {
    current: Option<RenderedChart>,
}

impl ChartHandle {
    pub fn show(&mut self, chart: RenderedChart) {
        self.current = Some(chart);
    }

    pub fn clear(&mut self) {
        if let Some(old) = self.current.take() {
            debug!(title = old.title(), "chart cleared");
        }
    }

    pub fn current(&self) -> Option<&RenderedChart> {
        self.current.as_ref()
    }

    pub fn is_drawn(&self) -> bool {
        self.current.is_some()
    }
}

fn price_bounds(points: &[PricePoint]) -> (f64, f64) {
    let prices = points.iter().map(|p| p.price);
    let low = prices.clone().fold(f64::INFINITY, f64::min);
    let high = prices.fold(f64::NEG_INFINITY, f64::max);

    if !low.is_finite() || !high.is_finite() {
        return (0.0, 1.0);
    }

    let pad = if high > low { (high - low) * 0.05 } else { 1.0 };
    (low - pad, high + pad)
}

fn buffer_lines(buffer: &Buffer, area: Rect) -> Vec<String> {
    (area.top()..area.bottom())
        .map(|y| {
            let mut line = String::with_capacity(area.width as usize);
            for x in area.left()..area.right() {
                line.push_str(buffer.cell((x, y)).map_or(" ", |cell| cell.symbol()));
            }
            line.trim_end().to_string()
        })
        .collect()
}

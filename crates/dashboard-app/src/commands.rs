//! Command parsing for the interactive session

use crate::error::{DashboardError, Result};
use dashboard_api::Ticker;

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Go to the list page
    Home,
    /// Filter the list page
    Search { text: String },
    /// Drop the list filter
    ClearSearch,
    /// Open a list entry by number or ticker
    Open { selector: String },
    /// Navigate to a route path
    Go { path: String },
    /// Request a prediction on the detail page
    Predict,
    /// Open the quarterly chart page
    Quarterly { ticker: Option<Ticker> },
    /// List stocks on the home page
    Stocks,
    /// List aggregate forecasts on the home page
    Sp500 { limit: Option<u32> },
    /// Quick Predict lookup; the raw input is validated by the panel
    Quick { input: String },
    /// Reload the current page
    Refresh,
    /// Previous page
    Back,
    /// Show help
    Help,
    /// Leave the session
    Exit,
}

impl Command {
    /// Parse a command from user input.
    ///
    /// Text without a leading `/` updates the list search.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(DashboardError::CommandError("Empty input".to_string()));
        }

        let Some(rest) = input.strip_prefix('/') else {
            return Ok(Command::Search {
                text: input.to_string(),
            });
        };

        let parts: Vec<&str> = rest.split_whitespace().collect();
        let Some((name, args)) = parts.split_first() else {
            return Ok(Command::Home);
        };

        // Route paths typed directly, e.g. `/stocks/AAPL`
        if name.contains('/') {
            return Ok(Command::Go {
                path: input.to_string(),
            });
        }

        match name.to_lowercase().as_str() {
            "home" => Ok(Command::Home),
            "search" | "s" => Ok(Command::Search {
                text: args.join(" "),
            }),
            "clear" | "cls" => Ok(Command::ClearSearch),
            "open" | "o" => {
                let selector = args.first().ok_or_else(|| {
                    DashboardError::CommandError("Missing entry for open command".to_string())
                })?;
                Ok(Command::Open {
                    selector: selector.to_string(),
                })
            }
            "go" | "g" => {
                let path = args.first().ok_or_else(|| {
                    DashboardError::CommandError("Missing route for go command".to_string())
                })?;
                Ok(Command::Go {
                    path: path.to_string(),
                })
            }
            "predict" | "p" => Ok(Command::Predict),
            "quarterly" | "qc" => {
                let ticker = args.first().map(|t| Ticker::parse(t)).transpose()?;
                Ok(Command::Quarterly { ticker })
            }
            "stocks" => Ok(Command::Stocks),
            "sp500" => {
                let limit = args
                    .first()
                    .map(|raw| {
                        raw.parse::<u32>()
                            .ok()
                            .filter(|limit| *limit > 0)
                            .ok_or_else(|| {
                                DashboardError::CommandError(format!(
                                    "Limit must be a positive number, got '{raw}'"
                                ))
                            })
                    })
                    .transpose()?;
                Ok(Command::Sp500 { limit })
            }
            "quick" | "qp" => Ok(Command::Quick {
                input: args.join(" "),
            }),
            "refresh" | "r" => Ok(Command::Refresh),
            "back" | "b" => Ok(Command::Back),
            "help" | "h" | "?" => Ok(Command::Help),
            "exit" | "quit" | "q" => Ok(Command::Exit),
            _ => Err(DashboardError::CommandError(format!("Unknown command: {}", name))),
        }
    }

    /// Get help text for all commands
    pub fn help_text() -> &'static str {
        r#"
Stock Dashboard Commands
========================

Navigation:
  /home                  Stock list
  /open <#|ticker>       Open a list entry
  /go <route>            Open a route: /, /stocks/AAPL, /quarterly-chart/AAPL
  /back                  Previous page
  /refresh               Reload the current page

List:
  /search <text>         Filter by name or ticker (plain text works too)
  /clear                 Show every entry
  /stocks                List stocks
  /sp500 [limit]         List S&P 500 60-day forecasts

Stock detail:
  /predict               Predict tomorrow's price
  /quarterly [ticker]    60-day forecast chart

Other:
  /quick <ticker>        Quick Predict (10 second deadline)
  /help                  Show help
  /exit                  Exit

Aliases:
  /s = /search    /o = /open    /g = /go       /p = /predict
  /qc = /quarterly    /qp = /quick    /b = /back    /q = /exit
"#
    }

    /// Get a short description of the command
    pub fn description(&self) -> &'static str {
        match self {
            Command::Home => "Stock list",
            Command::Search { .. } => "Filter the list",
            Command::ClearSearch => "Clear the filter",
            Command::Open { .. } => "Open an entry",
            Command::Go { .. } => "Open a route",
            Command::Predict => "Predict tomorrow's price",
            Command::Quarterly { .. } => "60-day forecast chart",
            Command::Stocks => "List stocks",
            Command::Sp500 { .. } => "List S&P 500 forecasts",
            Command::Quick { .. } => "Quick Predict",
            Command::Refresh => "Reload the page",
            Command::Back => "Previous page",
            Command::Help => "Show help",
            Command::Exit => "Exit the dashboard",
        }
    }
}

//! Command-line arguments

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use dashboard_api::{ApiConfig, ChartKind, Sp500Route, Ticker};
use dashboard_app::views::DEFAULT_SP500_LIMIT;
use dashboard_app::{DashboardConfig, ListSource};
use std::path::PathBuf;
use std::time::Duration;

/// Terminal dashboard for the stock prediction backend
#[derive(Debug, Parser)]
#[command(name = "stock-dashboard", version, about, long_about = None)]
pub struct Cli {
    /// Backend base URL [env: DASHBOARD_API_BASE, default: http://localhost:8000]
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Transport timeout per request in seconds [env: DASHBOARD_TIMEOUT_SECS]
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Path serving the S&P 500 forecasts [env: DASHBOARD_SP500_ROUTE]
    #[arg(long, global = true, value_enum)]
    pub sp500_route: Option<Sp500RouteArg>,

    /// Directory for downloaded chart images [env: DASHBOARD_CHART_DIR]
    #[arg(long, global = true)]
    pub chart_dir: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive session (the default)
    Interactive {
        /// Page to open first
        #[arg(long, default_value = "/")]
        route: String,

        /// Collection listed on the home page
        #[arg(long, value_enum, default_value_t = SourceArg::Stocks)]
        source: SourceArg,

        /// Number of S&P 500 forecasts when listing them
        #[arg(long)]
        limit: Option<u32>,
    },
    /// List stocks
    Stocks {
        /// Only entries whose name or ticker contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// List S&P 500 60-day forecasts
    Sp500 {
        #[arg(
            long,
            default_value_t = DEFAULT_SP500_LIMIT,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        limit: u32,
    },
    /// Price history chart for one stock
    History {
        #[arg(value_parser = Ticker::parse)]
        ticker: Ticker,
    },
    /// History plus tomorrow's price prediction
    Predict {
        #[arg(value_parser = Ticker::parse)]
        ticker: Ticker,
    },
    /// 60-day forecast and chart image
    Quarterly {
        #[arg(value_parser = Ticker::parse)]
        ticker: Ticker,
    },
    /// Download a server-rendered chart image
    Chart {
        #[arg(value_parser = Ticker::parse)]
        ticker: Ticker,

        #[arg(long, value_enum, default_value_t = ChartKindArg::Quarterly)]
        kind: ChartKindArg,

        /// Output file; defaults to {TICKER}-{kind}.{ext} in the chart directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Quick Predict with a 10 second deadline
    Quick { ticker: String },
}

impl Default for Command {
    fn default() -> Self {
        Self::Interactive {
            route: "/".to_string(),
            source: SourceArg::Stocks,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Sp500RouteArg {
    /// /predict/sp500
    Predict,
    /// /predict-sp500
    Legacy,
}

impl From<Sp500RouteArg> for Sp500Route {
    fn from(arg: Sp500RouteArg) -> Self {
        match arg {
            Sp500RouteArg::Predict => Self::Predict,
            Sp500RouteArg::Legacy => Self::Legacy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Stocks,
    Sp500,
}

impl SourceArg {
    pub fn list_source(self, limit: Option<u32>) -> ListSource {
        match self {
            Self::Stocks => ListSource::Stocks,
            Self::Sp500 => ListSource::Sp500 {
                limit: limit.unwrap_or(DEFAULT_SP500_LIMIT),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartKindArg {
    /// /predict/quarterly/{ticker}/chart
    Quarterly,
    /// /quarterly-predict-plot/{ticker}
    Plot,
}

impl From<ChartKindArg> for ChartKind {
    fn from(arg: ChartKindArg) -> Self {
        match arg {
            ChartKindArg::Quarterly => Self::Quarterly,
            ChartKindArg::Plot => Self::Plot,
        }
    }
}

impl Cli {
    /// Flags first, then `DASHBOARD_*` variables, then defaults
    pub fn dashboard_config(&self, source: ListSource) -> Result<DashboardConfig> {
        let mut api = ApiConfig::builder();
        if let Some(url) = &self.base_url {
            api = api.base_url(url);
        }
        if let Some(secs) = self.timeout_secs {
            api = api.request_timeout(Duration::from_secs(secs));
        }
        if let Some(route) = self.sp500_route {
            api = api.sp500_route(route.into());
        }
        let api = api.with_env()?.build()?;

        let mut builder = DashboardConfig::builder().api(api).list_source(source);
        if let Some(dir) = &self.chart_dir {
            builder = builder.chart_dir(dir);
        }
        Ok(builder.with_env()?.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_is_interactive() {
        let cli = Cli::try_parse_from(["stock-dashboard"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(
            cli.command.unwrap_or_default(),
            Command::Interactive { ref route, .. } if route == "/"
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "stock-dashboard",
            "predict",
            "aapl",
            "--base-url",
            "http://10.0.0.5:8000",
            "--sp500-route",
            "legacy",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.sp500_route, Some(Sp500RouteArg::Legacy));
        let Some(Command::Predict { ticker }) = &cli.command else {
            panic!("expected predict");
        };
        assert_eq!(ticker.as_str(), "AAPL");

        let config = cli.dashboard_config(ListSource::Stocks).unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.5:8000");
        assert_eq!(config.api.sp500_route, Sp500Route::Legacy);
    }

    #[test]
    fn test_invalid_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["stock-dashboard", "history", "$$$"]).is_err());
        assert!(Cli::try_parse_from(["stock-dashboard", "sp500", "--limit", "0"]).is_err());
        assert!(Cli::try_parse_from(["stock-dashboard", "chart", "MMM", "--kind", "pie"]).is_err());
    }

    #[test]
    fn test_interactive_sp500_source() {
        let cli = Cli::try_parse_from([
            "stock-dashboard",
            "interactive",
            "--source",
            "sp500",
            "--limit",
            "50",
        ])
        .unwrap();
        let Some(Command::Interactive { source, limit, .. }) = cli.command else {
            panic!("expected interactive");
        };
        assert_eq!(source.list_source(limit), ListSource::Sp500 { limit: 50 });
        assert_eq!(
            SourceArg::Sp500.list_source(None),
            ListSource::Sp500 { limit: 20 }
        );
    }
}

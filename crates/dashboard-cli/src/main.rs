//! Stock Dashboard CLI
//!
//! # Usage
//!
//! ```bash
//! # Point at the prediction backend
//! export DASHBOARD_API_BASE="http://localhost:8000"
//!
//! # Interactive session
//! cargo run --bin stock-dashboard
//!
//! # One-shot pages
//! cargo run --bin stock-dashboard -- stocks --search apple
//! cargo run --bin stock-dashboard -- predict AAPL
//! ```

mod cli;

use anyhow::Context;
use clap::Parser;
use dashboard_api::{PredictionApi, PredictionClient};
use dashboard_app::views::ListSource;
use dashboard_app::{Command as SessionCommand, Dashboard, Route, repl, save_chart};
use dashboard_utils::{LogFormat, LogOptions, init_tracing};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;

use crate::cli::{Cli, Command};

fn print_banner(base_url: &str) {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║                     Stock Dashboard                          ║
║                                                              ║
║  Commands:                                                   ║
║    /open <#|ticker>   - Open a list entry                    ║
║    /predict           - Predict tomorrow's price             ║
║    /quick <ticker>    - Quick Predict                        ║
║    /help              - Help                                 ║
║    /exit              - Exit                                 ║
║                                                              ║
║  Type any text to search the list.                           ║
╚══════════════════════════════════════════════════════════════╝
"#
    );
    println!("Backend: {base_url}\n");
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let mut cli = Cli::parse();

    init_tracing(&LogOptions {
        verbose: cli.verbose,
        format: LogFormat::from_env(),
        ..LogOptions::default()
    })
    .context("failed to initialize logging")?;

    let command = cli.command.take().unwrap_or_default();
    let source = match &command {
        Command::Interactive { source, limit, .. } => source.list_source(*limit),
        Command::Sp500 { limit } => ListSource::Sp500 { limit: *limit },
        _ => ListSource::Stocks,
    };
    let config = cli.dashboard_config(source)?;
    let client = Arc::new(PredictionClient::new(&config.api)?);
    info!(base_url = %config.api.base_url, "backend configured");

    let base_url = config.api.base_url.clone();
    let chart_dir = config.chart_dir.clone();
    let mut dashboard = Dashboard::new(client.clone(), config)?;

    match command {
        Command::Interactive { route, .. } => {
            print_banner(&base_url);
            dashboard.open(Route::parse(&route)?);
            let stdin = BufReader::new(tokio::io::stdin());
            repl::run(&mut dashboard, stdin, std::io::stdout()).await?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Chart { ticker, kind, out } => {
            let path = match out {
                Some(path) => {
                    let image = client.chart_image(kind.into(), &ticker).await?;
                    tokio::fs::write(&path, &image.bytes)
                        .await
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    path
                }
                None => {
                    save_chart(client.as_ref(), kind.into(), &ticker, &chart_dir)
                        .await?
                        .path
                }
            };
            println!("Chart saved to {}", path.display());
            return Ok(ExitCode::SUCCESS);
        }
        Command::Stocks { search } => {
            dashboard.open(Route::Home);
            dashboard.settle().await;
            if let Some(text) = search {
                dashboard.execute(SessionCommand::Search { text })?;
            }
        }
        Command::Sp500 { .. } => {
            dashboard.open(Route::Home);
            dashboard.settle().await;
        }
        Command::History { ticker } => {
            dashboard.open(Route::Stock(ticker));
            dashboard.settle().await;
        }
        Command::Predict { ticker } => {
            dashboard.open(Route::Stock(ticker));
            dashboard.execute(SessionCommand::Predict)?;
            dashboard.settle().await;
        }
        Command::Quarterly { ticker } => {
            dashboard.open(Route::QuarterlyChart(ticker));
            dashboard.settle().await;
        }
        Command::Quick { ticker } => {
            dashboard.execute(SessionCommand::Quick { input: ticker })?;
            dashboard.settle().await;
        }
    }

    println!("{}", dashboard.render());

    if let Some(failure) = dashboard.failure() {
        eprintln!("error: {failure}");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

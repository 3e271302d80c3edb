//! Line-oriented interactive loop

use crate::app::{Dashboard, Outcome};
use crate::commands::Command;
use crate::error::Result;
use crate::render::format_error;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

/// Read commands from `input` and print pages to `output` until `/exit` or EOF.
///
/// Completed fetches re-render the page as soon as they land, without waiting
/// for the next command.
pub async fn run<R, W>(dashboard: &mut Dashboard, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let prompt = dashboard.config().prompt.clone();
    let mut lines = input.lines();

    writeln!(output, "{}", dashboard.render())?;
    write!(output, "{prompt}")?;
    output.flush()?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    writeln!(output)?;
                    break;
                };
                if line.trim().is_empty() {
                    write!(output, "{prompt}")?;
                    output.flush()?;
                    continue;
                }

                match Command::parse(&line).and_then(|command| dashboard.execute(command)) {
                    Ok(Outcome::Exit) => break,
                    Ok(Outcome::Help) => writeln!(output, "{}", Command::help_text())?,
                    Ok(Outcome::Render) => writeln!(output, "{}", dashboard.render())?,
                    Err(e) => {
                        warn!(error = %e, "command failed");
                        writeln!(output, "{}", format_error(&e.to_string()))?;
                    }
                }
                write!(output, "{prompt}")?;
                output.flush()?;
            }
            Some(event) = dashboard.next_event() => {
                if dashboard.apply(event) {
                    writeln!(output, "\n{}", dashboard.render())?;
                    write!(output, "{prompt}")?;
                    output.flush()?;
                }
            }
        }
    }

    info!("interactive session ended");
    writeln!(output, "Goodbye!")?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use dashboard_api::MockPredictionApi;
    use std::sync::Arc;

    async fn session(script: &str) -> String {
        let config = DashboardConfig::builder().prompt("> ").build().unwrap();
        let mut dashboard = Dashboard::new(Arc::new(MockPredictionApi::new()), config).unwrap();
        let mut output = Vec::new();
        run(&mut dashboard, script.as_bytes(), &mut output)
            .await
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn test_help_and_exit() {
        let out = session("/help\n/exit\n/help\n").await;
        assert!(out.contains("Nothing to show."));
        assert_eq!(out.matches("Stock Dashboard Commands").count(), 1);
        assert!(out.trim_end().ends_with("Goodbye!"));
    }

    #[tokio::test]
    async fn test_errors_are_printed() {
        let out = session("/portfolio\n\n/predict\n").await;
        assert!(out.contains("Error: Command error: Unknown command: portfolio"));
        assert!(out.contains("Error: Command error: /predict is only available on a stock page"));
        assert!(out.contains("Goodbye!"));
    }

    #[tokio::test]
    async fn test_quick_predict_without_ticker() {
        let out = session("/quick\n").await;
        assert!(out.contains("Please enter a valid ticker."));
    }
}

//! Check command - verify the saved session.

use anyhow::Result;
use orderlens_scrape::ScrapeError;
use serde::Serialize;

use super::Completion;
use super::session::Session;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

#[derive(Serialize)]
struct CheckOutput {
    healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Runs the check command.
///
/// An unhealthy session is reported and then returned as the error, so the
/// exit code reflects it.
pub async fn run(cli: &Cli) -> Result<Completion> {
    let session = Session::open(cli).await?;
    let outcome = session.fetcher.health_check().await;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_check(outcome.as_ref().err()));
        }
        OutputFormat::Json => {
            let output = CheckOutput {
                healthy: outcome.is_ok(),
                error: outcome.as_ref().err().map(ScrapeError::to_string),
            };
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    outcome?;
    Ok(Completion::Done)
}

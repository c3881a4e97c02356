//! Years command - years that have orders.

use anyhow::Result;

use super::Completion;
use super::session::Session;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the years command.
pub async fn run(cli: &Cli) -> Result<Completion> {
    let session = Session::open(cli).await?;
    let years = session.fetcher.order_years().await?;

    match cli.format {
        OutputFormat::Text => println!("{}", TextFormatter::new(!cli.no_color).format_years(&years)),
        OutputFormat::Json => println!("{}", JsonFormatter::new(cli.pretty).format(&years)?),
    }
    Ok(Completion::Done)
}

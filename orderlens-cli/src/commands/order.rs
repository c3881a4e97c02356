//! Order command - one order's details.

use anyhow::Result;
use clap::Args;
use orderlens_core::OrderId;

use super::Completion;
use super::session::Session;
use crate::output::{JsonFormatter, OrderOutput, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the order command.
#[derive(Args)]
pub struct OrderArgs {
    /// Order id, e.g. 112-4559127-2161020.
    pub order_id: OrderId,

    /// Also fetch the order's payment transactions.
    #[arg(long, short)]
    pub transactions: bool,
}

/// Runs the order command.
pub async fn run(args: &OrderArgs, cli: &Cli) -> Result<Completion> {
    let session = Session::open(cli).await?;

    let (order, transactions) = if args.transactions {
        let (order, transactions) = session
            .fetcher
            .fetch_order_with_transactions(args.order_id.as_str())
            .await?;
        (order, Some(transactions))
    } else {
        (session.fetcher.fetch_order(args.order_id.as_str()).await?, None)
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_order(&order));
            if let Some(transactions) = &transactions {
                println!("{}", formatter.format_transactions(transactions));
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = OrderOutput {
                order: &order,
                transactions: transactions.as_deref(),
            };
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(Completion::Done)
}

//! Transactions command - payment charges for one or more orders.

use anyhow::Result;
use clap::Args;
use orderlens_core::OrderId;
use tracing::warn;

use super::Completion;
use super::session::Session;
use crate::output::{JsonFormatter, TextFormatter, TransactionsOutput};
use crate::{Cli, OutputFormat};

/// Arguments for the transactions command.
#[derive(Args)]
pub struct TransactionsArgs {
    /// Order ids.
    #[arg(required = true, num_args = 1..)]
    pub order_ids: Vec<OrderId>,
}

/// Runs the transactions command.
pub async fn run(args: &TransactionsArgs, cli: &Cli) -> Result<Completion> {
    let session = Session::open(cli).await?;
    let order_ids: Vec<String> = args.order_ids.iter().map(ToString::to_string).collect();

    let fetched = session
        .fetcher
        .fetch_all_transactions(&order_ids, &session.cancel)
        .await?;

    let missing: Vec<&str> = order_ids
        .iter()
        .filter(|id| !fetched.items.contains_key(*id))
        .map(String::as_str)
        .collect();
    if !fetched.cancelled && !missing.is_empty() {
        warn!(orders = ?missing, "No transactions fetched for some orders");
    }

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            for (order_id, transactions) in &fetched.items {
                println!("{}", formatter.format_order_transactions(order_id, transactions));
            }
            if fetched.cancelled {
                eprintln!("{}", formatter.format_interrupted(fetched.items.len()));
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = TransactionsOutput {
                transactions: &fetched.items,
                cancelled: fetched.cancelled,
            };
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(Completion::from_cancelled(fetched.cancelled))
}

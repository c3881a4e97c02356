//! Orders command - list orders for a year or date range.

use std::collections::BTreeMap;

use anyhow::{Result, bail};
use chrono::{Local, NaiveDate};
use clap::Args;
use orderlens_core::{Order, Transaction};
use orderlens_scrape::FetchOptions;
use tracing::info;

use super::Completion;
use super::session::Session;
use crate::output::{JsonFormatter, OrdersOutput, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the orders command.
#[derive(Args, Default)]
pub struct OrdersArgs {
    /// Year to fetch. Defaults to the current year.
    #[arg(long, short, conflicts_with_all = ["from", "to"])]
    pub year: Option<i32>,

    /// Earliest order date (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Latest order date (YYYY-MM-DD). Defaults to today when --from is set.
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Stop after this many orders.
    #[arg(long, short)]
    pub max: Option<usize>,

    /// Fetch each order's detail page (items and price breakdown).
    #[arg(long, short)]
    pub details: bool,

    /// Fetch each order's payment transactions.
    #[arg(long, short)]
    pub transactions: bool,
}

impl OrdersArgs {
    /// Builds fetch options from the arguments.
    fn to_options(&self, today: NaiveDate) -> Result<FetchOptions> {
        let mut options = match (self.year, self.from, self.to) {
            (Some(year), _, _) => FetchOptions::for_year(year),
            (None, Some(from), to) => FetchOptions::between(from, to.unwrap_or(today)),
            (None, None, Some(to)) => FetchOptions::default().with_end_date(to),
            (None, None, None) => FetchOptions::default(),
        };

        if let (Some(start), Some(end)) = (options.start_date, options.end_date) {
            if start > end {
                bail!("--from {start} is after --to {end}");
            }
        }

        if let Some(max) = self.max {
            options = options.with_max_orders(max);
        }
        Ok(options.with_details(self.details))
    }
}

/// Runs the orders command.
pub async fn run(args: &OrdersArgs, cli: &Cli) -> Result<Completion> {
    let options = args.to_options(Local::now().date_naive())?;
    let session = Session::open(cli).await?;

    info!(years = ?options.years(Local::now().date_naive()), "Fetching orders");
    let fetched = session.fetcher.fetch_orders(&options, &session.cancel).await?;
    let mut cancelled = fetched.cancelled;
    let orders = fetched.items;

    let mut transactions = BTreeMap::new();
    if args.transactions && !cancelled && !orders.is_empty() {
        let ids: Vec<String> = orders.iter().map(|o| o.id.clone()).collect();
        let fetched = session
            .fetcher
            .fetch_all_transactions(&ids, &session.cancel)
            .await?;
        cancelled = fetched.cancelled;
        transactions = fetched.items;
    }

    output_orders(&orders, &transactions, cancelled, cli)?;
    Ok(Completion::from_cancelled(cancelled))
}

fn output_orders(
    orders: &[Order],
    transactions: &BTreeMap<String, Vec<Transaction>>,
    cancelled: bool,
    cli: &Cli,
) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_orders(orders, transactions));
            if cancelled {
                eprintln!("{}", formatter.format_interrupted(orders.len()));
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = OrdersOutput::new(orders, transactions, cancelled);
            println!("{}", formatter.format(&output)?);
        }
    }
    Ok(())
}

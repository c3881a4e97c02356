//! Import command - session cookies from a "Copy as cURL" command.

use std::io::Read;

use anyhow::{Context, Result, bail};
use clap::Args;
use orderlens_fetch::CredentialCarrier;
use serde::Serialize;

use super::Completion;
use super::session::{load_settings, open_cookie_store};
use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the import-curl command.
#[derive(Args)]
pub struct ImportArgs {
    /// The curl command, or `-` to read it from stdin.
    pub curl: String,
}

#[derive(Serialize)]
struct ImportOutput<'a> {
    imported: usize,
    essential: bool,
    path: &'a str,
}

/// Runs the import-curl command.
pub async fn run(args: &ImportArgs, cli: &Cli) -> Result<Completion> {
    let command = read_command(&args.curl)?;

    let settings = load_settings(cli).await;
    let store = open_cookie_store(cli, &settings).await?;
    let imported = store.import_from_curl(&command).await?;
    let essential = store.has_essential_cookies();
    let path = store.path().display().to_string();

    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                println!("Imported {imported} cookies into {path}");
                if !essential {
                    println!(
                        "Warning: the session cookies are incomplete; copy the request for the orders page"
                    );
                }
            }
        }
        OutputFormat::Json => {
            let output = ImportOutput {
                imported,
                essential,
                path: &path,
            };
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    Ok(Completion::Done)
}

fn read_command(arg: &str) -> Result<String> {
    let command = if arg == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read curl command from stdin")?;
        buf
    } else {
        arg.to_string()
    };

    if command.trim().is_empty() {
        bail!("Empty curl command");
    }
    Ok(command)
}

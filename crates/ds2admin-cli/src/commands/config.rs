//! Config command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::console::Console;
use crate::output;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print the raw configuration as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: ConfigArgs, console: &Console) -> Result<()> {
    console.require_session().await?;

    let config = console
        .session
        .config()
        .context("Admin configuration unavailable")?;

    if args.json {
        output::json_pretty(&config)?;
    } else {
        output::field("Keys", &config.key_count().to_string());
        output::field("Accounts", &config.account_count().to_string());
    }

    Ok(())
}

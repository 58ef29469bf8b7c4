//! Logout command implementation.

use anyhow::{Context, Result};

use crate::console::Console;
use crate::output;

pub async fn run(console: &Console) -> Result<()> {
    console
        .session
        .logout()
        .await
        .context("Failed to clear stored session")?;

    output::success("Logged out");
    Ok(())
}

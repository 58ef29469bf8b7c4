//! Login command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;

use ds2admin::{AdminKey, Durability};

use crate::console::Console;
use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Admin key
    #[arg(long, env = "DS2ADMIN_KEY", hide_env_values = true)]
    pub key: String,

    /// Keep the token for this process only
    #[arg(long)]
    pub no_remember: bool,
}

pub async fn run(args: LoginArgs, console: &Console) -> Result<()> {
    let key = AdminKey::new(args.key).context("Invalid admin key")?;
    let durability = Durability::from_remember(!args.no_remember);

    eprintln!("{}", "Logging in...".dimmed());
    sign_in(console, &key, durability).await
}

/// Log in and print the resulting session. Shared with the shell.
pub async fn sign_in(console: &Console, key: &AdminKey, durability: Durability) -> Result<()> {
    let phase = console
        .session
        .login(key, durability)
        .await
        .context("Failed to login")?;

    if !phase.is_authenticated() {
        bail!("Session ended right after login");
    }

    output::success("Logged in successfully");
    println!();
    output::field("Server", console.session.gateway().base_url().as_str());
    if let Some(credential) = console.session.stored_credential().await.ok().flatten() {
        output::field("Expires", &output::local_time(credential.expires_at));
    }
    let storage = match durability {
        Durability::Durable => "remembered",
        Durability::Ephemeral => "this session only",
    };
    output::field("Storage", storage);

    if let Some(config) = console.session.config() {
        output::field("Keys", &config.key_count().to_string());
        output::field("Accounts", &config.account_count().to_string());
    }

    Ok(())
}

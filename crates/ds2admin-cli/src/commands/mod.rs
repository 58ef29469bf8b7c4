//! Subcommand implementations.

pub mod config;
pub mod login;
pub mod logout;
pub mod request;
pub mod shell;
pub mod status;

use anyhow::Result;

use crate::cli::Commands;
use crate::console::Console;

pub async fn handle(command: Commands, console: &Console) -> Result<()> {
    match command {
        Commands::Login(args) => login::run(args, console).await,
        Commands::Logout => logout::run(console).await,
        Commands::Status => status::run(console).await,
        Commands::Config(args) => config::run(args, console).await,
        Commands::Request(args) => request::run(args, console).await,
        Commands::Shell => shell::run(console).await,
    }
}

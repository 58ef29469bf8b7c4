//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{config, login, request};

/// Default admin backend address.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5001";

/// Terminal client for the DS2API admin console.
#[derive(Parser, Debug)]
#[command(name = "ds2admin")]
#[command(author, version = env!("DS2ADMIN_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Admin backend base URL
    #[arg(long, env = "DS2ADMIN_SERVER", default_value = DEFAULT_SERVER, global = true)]
    pub server: String,

    /// Directory holding the remembered session
    #[arg(long, env = "DS2ADMIN_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30, global = true)]
    pub timeout_secs: u64,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Exchange the admin key for a session token
    Login(login::LoginArgs),

    /// End the session and forget the stored token
    Logout,

    /// Check the stored session against the backend
    Status,

    /// Show the admin configuration
    Config(config::ConfigArgs),

    /// Send an authenticated request to an /admin/ endpoint
    Request(request::RequestArgs),

    /// Interactive session sharing one login
    Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ds2admin",
            "status",
            "--server",
            "https://admin.example.com",
            "--timeout-secs",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.server, "https://admin.example.com");
        assert_eq!(cli.timeout_secs, 5);
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn login_remembers_by_default() {
        let cli = Cli::try_parse_from(["ds2admin", "login", "--key", "k"]).unwrap();
        let Commands::Login(args) = cli.command else {
            panic!("expected login");
        };
        assert!(!args.no_remember);
    }
}

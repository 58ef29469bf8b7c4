//! Interactive shell.
//!
//! Every line runs against the same controller, so a login made with
//! `--no-remember` stays usable until the shell exits.

use std::io::Write;

use anyhow::Result;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use ds2admin::{AdminKey, Durability, RequestOptions};

use crate::console::Console;
use crate::output;

use super::{login, logout, request, status};

const HELP: &str = "commands: login <key> [--no-remember], logout, status, config, get <path>, quit";

/// One parsed shell line.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Empty,
    Login { key: &'a str, remember: bool },
    Logout,
    Status,
    Config,
    Get(&'a str),
    Help,
    Quit,
    Unknown(String),
}

fn parse(line: &str) -> Line<'_> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words[..] {
        [] => Line::Empty,
        ["login", key] => Line::Login {
            key,
            remember: true,
        },
        ["login", key, "--no-remember"] | ["login", "--no-remember", key] => Line::Login {
            key,
            remember: false,
        },
        ["logout"] => Line::Logout,
        ["status"] => Line::Status,
        ["config"] => Line::Config,
        ["get", path] => Line::Get(path),
        ["help"] => Line::Help,
        ["quit"] | ["exit"] => Line::Quit,
        _ => Line::Unknown(line.trim().to_string()),
    }
}

pub async fn run(console: &Console) -> Result<()> {
    let phase = console.session.start().await;
    println!("{} ({})", HELP.dimmed(), phase.label());
    console.report();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("ds2admin> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let outcome = match parse(&line) {
            Line::Empty => Ok(()),
            Line::Quit => break,
            Line::Help => {
                println!("{}", HELP);
                Ok(())
            }
            Line::Login { key, remember } => match AdminKey::new(key) {
                Ok(key) => {
                    login::sign_in(console, &key, Durability::from_remember(remember)).await
                }
                Err(e) => Err(e.into()),
            },
            Line::Logout => logout::run(console).await,
            Line::Status => status::run(console).await,
            Line::Config => show_config(console),
            Line::Get(path) => request::send(console, path, RequestOptions::get()).await,
            Line::Unknown(text) => {
                output::error(&format!("unknown command: {}", text));
                Ok(())
            }
        };

        console.report();
        if let Err(e) = outcome {
            output::error(&format!("{:#}", e));
        }
    }

    Ok(())
}

fn show_config(console: &Console) -> Result<()> {
    let Some(config) = console.session.config() else {
        anyhow::bail!("Admin configuration unavailable");
    };
    output::field("Keys", &config.key_count().to_string());
    output::field("Accounts", &config.account_count().to_string());
    Ok(())
}

//! Request command implementation.

use anyhow::{Context, Result};
use clap::Args;

use ds2admin::{Method, RequestOptions};

use crate::console::Console;
use crate::output;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Endpoint path, starting with /admin/
    pub path: String,

    /// HTTP method
    #[arg(long, short = 'X', default_value = "GET")]
    pub method: String,

    /// JSON request body
    #[arg(long, short = 'd')]
    pub data: Option<String>,
}

pub async fn run(args: RequestArgs, console: &Console) -> Result<()> {
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .context("Invalid HTTP method")?;

    let mut options = RequestOptions::method(method);
    if let Some(data) = args.data {
        let body: serde_json::Value =
            serde_json::from_str(&data).context("Request body is not valid JSON")?;
        options = options.json_value(body);
    }

    console.require_session().await?;
    send(console, &args.path, options).await
}

/// Send through the session and print status and body. Shared with the
/// shell.
pub async fn send(console: &Console, path: &str, options: RequestOptions) -> Result<()> {
    let response = console
        .session
        .request(path, options)
        .await
        .context("Request failed")?;

    let status = response.status();
    let text = response.text().await.context("Failed to read response")?;

    output::field("Status", status.as_str());
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(body) => output::json_pretty(&body)?,
        Err(_) if text.is_empty() => {}
        Err(_) => println!("{}", text),
    }

    if !status.is_success() {
        anyhow::bail!("Server answered {}", status);
    }
    Ok(())
}

//! Status command implementation.

use anyhow::Result;

use crate::console::Console;
use crate::output;

pub async fn run(console: &Console) -> Result<()> {
    let phase = console.session.start().await;

    output::field("Server", console.session.gateway().base_url().as_str());
    output::field("Data", &console.data_dir().display().to_string());
    output::field("Phase", phase.label());

    if !phase.is_authenticated() {
        return Ok(());
    }

    if let Some(credential) = console.session.stored_credential().await? {
        output::field("Expires", &output::local_time(credential.expires_at));
        let remaining = credential.remaining();
        output::field(
            "Remaining",
            &format!("{}h {}m", remaining.num_hours(), remaining.num_minutes() % 60),
        );
    }

    if let Some(config) = console.session.config() {
        output::field("Keys", &config.key_count().to_string());
        output::field("Accounts", &config.account_count().to_string());
    }

    Ok(())
}

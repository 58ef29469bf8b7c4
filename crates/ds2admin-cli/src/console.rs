//! Wiring between the command line and the session core.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use tracing::debug;

use ds2admin::{
    AdminUrl, ClientConfig, FileBacking, MemoryBacking, SessionController, TokenStore,
};

use crate::cli::Cli;
use crate::output;

/// A session controller plus the data directory it persists to.
pub struct Console {
    pub session: SessionController,
    data_dir: PathBuf,
}

impl Console {
    /// Build the controller described by the global options.
    ///
    /// The durable tier is a file in the data directory; the ephemeral tier
    /// lives only as long as this process.
    pub fn open(cli: &Cli) -> Result<Self> {
        let base_url = AdminUrl::new(&cli.server).context("Invalid server URL")?;
        let config = ClientConfig::new(base_url)
            .with_request_timeout(Duration::from_secs(cli.timeout_secs));

        let data_dir = match &cli.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir()?,
        };
        fs::create_dir_all(&data_dir).context("Failed to create data directory")?;
        debug!(server = %config.base_url, data_dir = %data_dir.display(), "Opening console");

        let store = TokenStore::new(
            Arc::new(FileBacking::in_dir(&data_dir)),
            Arc::new(MemoryBacking::new()),
        );
        let session = SessionController::from_config(&config, store)
            .context("Failed to create admin client")?;

        Ok(Self { session, data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Run the startup check and insist on an authenticated session.
    pub async fn require_session(&self) -> Result<()> {
        if !self.session.start().await.is_authenticated() {
            bail!("Not logged in. Run 'ds2admin login' first.");
        }
        Ok(())
    }

    /// Print the pending notification, if any, and clear it.
    pub fn report(&self) {
        let notifications = self.session.notifications();
        if let Some(notice) = notifications.current() {
            output::notification(&notice);
            notifications.dismiss();
        }
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "ds2admin").context("Could not determine data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

//! Token store.
//!
//! Persists the [`Credential`] in one of two [`StorageBacking`]s selected by
//! its [`Durability`], and presents a single "current stored token" view over
//! both. The backings are kept mutually exclusive: writing to one clears the
//! other, and clearing always empties both, so a stale duplicate can never
//! resurrect a logged-out session.

mod backing;
mod file;

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::Result;
use crate::auth::{BearerToken, Credential, Durability};

pub use backing::{MemoryBacking, StorageBacking};
pub use file::FileBacking;

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "ds2api_token";

/// Key holding the absolute expiry in milliseconds since the Unix epoch.
pub const EXPIRES_KEY: &str = "ds2api_token_expires";

/// Dual-tier credential storage.
#[derive(Clone)]
pub struct TokenStore {
    durable: Arc<dyn StorageBacking>,
    ephemeral: Arc<dyn StorageBacking>,
}

impl TokenStore {
    pub fn new(durable: Arc<dyn StorageBacking>, ephemeral: Arc<dyn StorageBacking>) -> Self {
        Self { durable, ephemeral }
    }

    /// A store whose durable tier lives at `path` and whose ephemeral tier
    /// lives in memory.
    pub fn with_file(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            Arc::new(FileBacking::new(path)),
            Arc::new(MemoryBacking::new()),
        )
    }

    /// Both tiers in memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBacking::new()), Arc::new(MemoryBacking::new()))
    }

    /// The backing for a tier.
    pub fn backing(&self, durability: Durability) -> &dyn StorageBacking {
        match durability {
            Durability::Durable => self.durable.as_ref(),
            Durability::Ephemeral => self.ephemeral.as_ref(),
        }
    }

    /// Store a credential in the tier it names and empty the other tier.
    #[instrument(skip(self, credential), fields(durability = ?credential.durability))]
    pub async fn write(&self, credential: &Credential) -> Result<()> {
        let target = self.backing(credential.durability);
        target.set(TOKEN_KEY, credential.token.as_str()).await?;
        target
            .set(EXPIRES_KEY, &credential.expires_at_millis().to_string())
            .await?;

        Self::clear_backing(self.backing(credential.durability.other())).await?;

        debug!("Credential stored");
        Ok(())
    }

    /// Return the stored credential, durable tier first.
    pub async fn read(&self) -> Result<Option<Credential>> {
        for durability in [Durability::Durable, Durability::Ephemeral] {
            if let Some(credential) = Self::read_backing(self.backing(durability), durability).await? {
                return Ok(Some(credential));
            }
        }
        Ok(None)
    }

    /// Remove the credential from both tiers.
    ///
    /// Both tiers are attempted even if the first fails; the first failure is
    /// returned.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        let durable = Self::clear_backing(self.durable.as_ref()).await;
        let ephemeral = Self::clear_backing(self.ephemeral.as_ref()).await;

        if let Err(ref e) = durable {
            warn!(error = %e, "Failed to clear durable credential");
        }
        if let Err(ref e) = ephemeral {
            warn!(error = %e, "Failed to clear ephemeral credential");
        }

        durable.and(ephemeral)
    }

    async fn read_backing(
        backing: &dyn StorageBacking,
        durability: Durability,
    ) -> Result<Option<Credential>> {
        let token = match backing.get(TOKEN_KEY).await? {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(None),
        };

        // A token without a readable expiry is treated as long expired.
        let expires_at_ms = backing
            .get(EXPIRES_KEY)
            .await?
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(0);

        Ok(Some(Credential::from_millis(
            BearerToken::new(token)?,
            expires_at_ms,
            durability,
        )))
    }

    async fn clear_backing(backing: &dyn StorageBacking) -> Result<()> {
        backing.remove(TOKEN_KEY).await?;
        backing.remove(EXPIRES_KEY).await
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(durability: Durability) -> Credential {
        Credential::issued(BearerToken::new("tok-1").unwrap(), 3600, durability)
    }

    #[tokio::test]
    async fn write_then_read_reports_tier() {
        let store = TokenStore::in_memory();
        store.write(&credential(Durability::Ephemeral)).await.unwrap();

        let read = store.read().await.unwrap().unwrap();
        assert_eq!(read.token.as_str(), "tok-1");
        assert_eq!(read.durability, Durability::Ephemeral);
    }

    #[tokio::test]
    async fn writing_one_tier_empties_the_other() {
        let store = TokenStore::in_memory();

        store.write(&credential(Durability::Ephemeral)).await.unwrap();
        store.write(&credential(Durability::Durable)).await.unwrap();
        let ephemeral = store.backing(Durability::Ephemeral);
        assert_eq!(ephemeral.get(TOKEN_KEY).await.unwrap(), None);
        assert_eq!(ephemeral.get(EXPIRES_KEY).await.unwrap(), None);

        store.write(&credential(Durability::Ephemeral)).await.unwrap();
        let durable = store.backing(Durability::Durable);
        assert_eq!(durable.get(TOKEN_KEY).await.unwrap(), None);
        assert_eq!(durable.get(EXPIRES_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let store = TokenStore::in_memory();
        store.write(&credential(Durability::Durable)).await.unwrap();

        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expiry_is_persisted_in_millis() {
        let store = TokenStore::in_memory();
        let cred = credential(Durability::Durable);
        store.write(&cred).await.unwrap();

        let raw = store
            .backing(Durability::Durable)
            .get(EXPIRES_KEY)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(raw, cred.expires_at_millis().to_string());
    }

    #[tokio::test]
    async fn token_without_expiry_reads_as_expired() {
        let store = TokenStore::in_memory();
        store
            .backing(Durability::Durable)
            .set(TOKEN_KEY, "orphan")
            .await
            .unwrap();

        let read = store.read().await.unwrap().unwrap();
        assert!(read.is_expired());
    }

    #[tokio::test]
    async fn expiry_without_token_reads_as_absent() {
        let store = TokenStore::in_memory();
        store
            .backing(Durability::Ephemeral)
            .set(EXPIRES_KEY, "99999999999999")
            .await
            .unwrap();

        assert!(store.read().await.unwrap().is_none());
    }
}

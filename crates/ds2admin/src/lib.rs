//! ds2admin - session core for the DS2API admin console.
//!
//! This library owns everything the console needs to hold an authenticated
//! session against the admin backend: the dual-tier token store, the
//! stateless auth gateway, the session state machine, and the single-slot
//! notification queue views report through. All authenticated calls flow
//! through a [`SessionController`].
//!
//! # Example
//!
//! ```no_run
//! use ds2admin::{AdminKey, AdminUrl, ClientConfig, Durability, SessionController, TokenStore};
//!
//! # async fn example() -> Result<(), ds2admin::Error> {
//! let config = ClientConfig::new(AdminUrl::new("http://127.0.0.1:5001")?);
//! let session = SessionController::from_config(&config, TokenStore::with_file("session.json"))?;
//!
//! if !session.start().await.is_authenticated() {
//!     session.login(&AdminKey::new("admin-key")?, Durability::Durable).await?;
//! }
//!
//! if let Some(config) = session.config() {
//!     println!("{} keys, {} accounts", config.key_count(), config.account_count());
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod session;
pub mod store;
pub mod types;

// Re-export primary types at crate root for convenience
pub use auth::{AdminKey, BearerToken, Credential, Durability};
pub use config::ClientConfig;
pub use error::{Error, ErrorClass};
pub use gateway::{AdminConfig, AuthGateway, LoginGrant, Method, RequestOptions, VerifyOutcome};
pub use notify::{Notification, NotificationKind, NotificationQueue};
pub use session::{SessionController, SessionPhase};
pub use store::{FileBacking, MemoryBacking, StorageBacking, TokenStore};
pub use types::AdminUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

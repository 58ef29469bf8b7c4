//! Credential primitives.
//!
//! This module provides the admin login secret, the opaque bearer token the
//! backend issues for it, and the [`Credential`] record that pairs a token
//! with its expiry and the storage tier it lives in.

mod admin_key;
mod credential;
mod token;

pub use admin_key::AdminKey;
pub use credential::{Credential, Durability};
pub use token::BearerToken;

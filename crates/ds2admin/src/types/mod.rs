//! Validated value types shared across the crate.

mod admin_url;

pub use admin_url::AdminUrl;

//! Admin login secret.

use std::fmt;

use crate::error::{Error, InvalidInputError};

/// The admin key exchanged for a bearer token at login.
///
/// # Security
///
/// The key is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use ds2admin::AdminKey;
///
/// let key = AdminKey::new("s3cret").unwrap();
/// assert!(!format!("{:?}", key).contains("s3cret"));
/// ```
#[derive(Clone)]
pub struct AdminKey(String);

impl AdminKey {
    /// Create a new admin key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or only whitespace.
    pub fn new(key: impl Into<String>) -> Result<Self, Error> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(InvalidInputError::AdminKey.into());
        }
        Ok(Self(key))
    }

    /// Returns the key.
    ///
    /// # Security
    ///
    /// Use this only when constructing the login request body.
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AdminKey").field(&"[REDACTED]").finish()
    }
}

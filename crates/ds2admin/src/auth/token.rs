//! Bearer token type.

use std::fmt;

use crate::error::{Error, InvalidInputError};

/// A bearer token issued by `/admin/login`.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Create a new bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, Error> {
        let token = token.into();
        if token.is_empty() {
            return Err(InvalidInputError::Token.into());
        }
        Ok(Self(token))
    }

    /// Returns the token value for use in authorization headers and storage.
    ///
    /// # Security
    ///
    /// Never log or display this value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BearerToken").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_hides_value_in_debug() {
        let token = BearerToken::new("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...").unwrap();
        let debug = format!("{:?}", token);
        assert!(!debug.contains("eyJ"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn empty_token_is_rejected() {
        assert!(BearerToken::new("").is_err());
    }
}

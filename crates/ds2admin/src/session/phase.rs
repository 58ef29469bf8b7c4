//! Session phase.

use std::fmt;

use crate::auth::BearerToken;

/// Where the session stands.
///
/// Holding the token inside `Authenticated` makes "authenticated without a
/// token" unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Startup check in progress. Entered once, at construction.
    Checking,
    /// A token is held and believed valid.
    Authenticated(BearerToken),
    /// No usable token.
    Unauthenticated,
}

impl SessionPhase {
    /// The held token, if authenticated.
    pub fn token(&self) -> Option<&BearerToken> {
        match self {
            SessionPhase::Authenticated(token) => Some(token),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionPhase::Authenticated(_))
    }

    pub fn is_checking(&self) -> bool {
        matches!(self, SessionPhase::Checking)
    }

    /// Short name for logs and status output.
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Checking => "checking",
            SessionPhase::Authenticated(_) => "authenticated",
            SessionPhase::Unauthenticated => "unauthenticated",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

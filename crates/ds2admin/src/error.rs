//! Error types for the ds2admin library.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, protocol, input validation and storage errors.
//! [`Error::class`] collapses them into the handful of outcomes the session
//! policy cares about.

use std::fmt;
use thiserror::Error;

/// The unified error type for ds2admin operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (refused key, rejected or expired token).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Protocol errors (unexpected status, malformed response body).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (bad URL, blank key, unencodable header).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Token store backing failures.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Coarse classification of an [`Error`] used to decide what happens to
/// the session and what the user is told.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The credential was definitively refused by the backend.
    AuthRejected,
    /// The backend could not be reached.
    NetworkFailure,
    /// The backend answered with something we could not use.
    ValidationFailure,
    /// The session ended while the request was in flight.
    SessionExpired,
    /// A local failure (input, storage, no session).
    Local,
}

impl Error {
    /// Classify this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Transport(_) => ErrorClass::NetworkFailure,
            Error::Auth(AuthError::InvalidKey { .. }) | Error::Auth(AuthError::Rejected) => {
                ErrorClass::AuthRejected
            }
            Error::Auth(AuthError::SessionExpired) => ErrorClass::SessionExpired,
            Error::Auth(AuthError::NotAuthenticated) => ErrorClass::Local,
            Error::Protocol(_) => ErrorClass::ValidationFailure,
            Error::InvalidInput(_) | Error::Storage(_) => ErrorClass::Local,
        }
    }

    /// Text suitable for showing to the operator.
    ///
    /// Server-provided detail is preferred over the variant's own wording.
    pub fn user_message(&self) -> String {
        match self {
            Error::Auth(AuthError::InvalidKey { detail }) => detail.clone(),
            Error::Auth(e) => e.to_string(),
            Error::Transport(e) => format!("network error: {}", e),
            Error::Protocol(ProtocolError {
                detail: Some(detail),
                ..
            }) => detail.clone(),
            other => other.to_string(),
        }
    }

    /// Returns true if the session ended underneath this call.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Error::Auth(AuthError::SessionExpired))
    }

    /// Returns true if the backend could not be reached.
    pub fn is_network_failure(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // A body that arrived but failed to decode is the server's fault,
        // not the network's.
        if err.is_decode() {
            Error::Protocol(ProtocolError::malformed(err.to_string()))
        } else {
            Error::Transport(TransportError::from(err))
        }
    }
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The admin key was refused at login.
    #[error("login refused: {detail}")]
    InvalidKey { detail: String },

    /// The backend answered 401 to a bearer-authenticated call.
    #[error("token rejected")]
    Rejected,

    /// The session was ended because a request was rejected.
    #[error("authentication expired, please log in again")]
    SessionExpired,

    /// No token is held, so no authenticated request can be made.
    #[error("not logged in")]
    NotAuthenticated,
}

/// Protocol-level errors from admin API responses.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code, when the failure came from a status line.
    pub status: Option<u16>,
    /// Error detail from the server or the decoder.
    pub detail: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}", status)?,
            None => write!(f, "malformed response")?,
        }
        if let Some(ref detail) = self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create an error for an unexpected status.
    pub fn status(status: u16, detail: Option<String>) -> Self {
        Self {
            status: Some(status),
            detail,
        }
    }

    /// Create an error for a body that could not be decoded.
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self {
            status: None,
            detail: Some(detail.into()),
        }
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid admin server URL.
    #[error("invalid admin URL '{value}': {reason}")]
    AdminUrl { value: String, reason: String },

    /// Blank admin key.
    #[error("admin key must not be empty")]
    AdminKey,

    /// Blank bearer token.
    #[error("token must not be empty")]
    Token,

    /// Header that cannot be sent.
    #[error("invalid header '{name}': {reason}")]
    Header { name: String, reason: String },

    /// Request body that does not serialize.
    #[error("invalid request body: {reason}")]
    Body { reason: String },

    /// Request path outside the admin API.
    #[error("invalid path '{value}': {reason}")]
    Path { value: String, reason: String },
}

/// Token store errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backing I/O failed.
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// Backing contents could not be decoded.
    #[error("corrupt storage at {path}: {message}")]
    Corrupt { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_auth_errors() {
        let refused: Error = AuthError::InvalidKey {
            detail: "bad key".into(),
        }
        .into();
        assert_eq!(refused.class(), ErrorClass::AuthRejected);
        assert_eq!(
            Error::from(AuthError::Rejected).class(),
            ErrorClass::AuthRejected
        );
        assert_eq!(
            Error::from(AuthError::SessionExpired).class(),
            ErrorClass::SessionExpired
        );
        assert!(Error::from(AuthError::SessionExpired).is_session_expired());
    }

    #[test]
    fn classifies_transport_and_protocol() {
        let net: Error = TransportError::Connection {
            message: "refused".into(),
        }
        .into();
        assert_eq!(net.class(), ErrorClass::NetworkFailure);
        assert!(net.is_network_failure());

        let bad: Error = ProtocolError::status(500, Some("boom".into())).into();
        assert_eq!(bad.class(), ErrorClass::ValidationFailure);
    }

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::status(403, Some("forbidden".into()));
        assert_eq!(err.to_string(), "HTTP 403: forbidden");

        let err = ProtocolError::malformed("expected value at line 1");
        assert_eq!(err.to_string(), "malformed response: expected value at line 1");
    }

    #[test]
    fn user_messages_prefer_server_detail() {
        let refused: Error = AuthError::InvalidKey {
            detail: "invalid admin key".into(),
        }
        .into();
        assert_eq!(refused.user_message(), "invalid admin key");

        let expired: Error = AuthError::SessionExpired.into();
        assert_eq!(
            expired.user_message(),
            "authentication expired, please log in again"
        );

        let net: Error = TransportError::Connection {
            message: "refused".into(),
        }
        .into();
        assert_eq!(net.user_message(), "network error: connection failed: refused");

        let bad: Error = ProtocolError::status(500, None).into();
        assert_eq!(bad.user_message(), "protocol error: HTTP 500");
    }

    #[test]
    fn session_expired_message() {
        let err = Error::from(AuthError::SessionExpired);
        assert_eq!(
            err.to_string(),
            "authentication error: authentication expired, please log in again"
        );
    }
}

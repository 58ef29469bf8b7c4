//! Options for an authenticated request.

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

use crate::error::{Error, InvalidInputError};

/// Method, headers, query and body for a call made through
/// [`AuthGateway::authenticated_request`](super::AuthGateway::authenticated_request).
///
/// The `Authorization` header is always set by the gateway; one supplied
/// here is overwritten.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub(crate) method: Method,
    pub(crate) headers: HeaderMap,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<serde_json::Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self::method(Method::POST)
    }

    pub fn put() -> Self {
        Self::method(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::method(Method::DELETE)
    }

    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Add a header.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or value cannot be sent over HTTP.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self, Error> {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| InvalidInputError::Header {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| InvalidInputError::Header {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Send `body` as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` does not serialize.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, Error> {
        let value = serde_json::to_value(body).map_err(|e| InvalidInputError::Body {
            reason: e.to_string(),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Send an already-built JSON value.
    pub fn json_value(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn http_method(&self) -> &Method {
        &self.method
    }
}

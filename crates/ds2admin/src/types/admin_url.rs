//! Admin server URL type.

use std::fmt;

use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated base URL for the admin backend.
///
/// This type ensures the URL is absolute, uses HTTPS (or HTTP for localhost),
/// and is properly normalized for endpoint construction.
///
/// # Example
///
/// ```
/// use ds2admin::AdminUrl;
///
/// let server = AdminUrl::new("https://api.example.com/").unwrap();
/// assert_eq!(server.endpoint("/admin/login"),
///            "https://api.example.com/admin/login");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AdminUrl(Url);

impl AdminUrl {
    /// Create a new admin URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::AdminUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        // Normalize: remove trailing slash
        let normalized = if url.path() == "/" {
            let mut u = url.clone();
            u.set_path("");
            u
        } else {
            url
        };

        Ok(Self(normalized))
    }

    /// Returns the full URL for an endpoint path such as `/admin/verify`.
    pub fn endpoint(&self, path: &str) -> String {
        // The URL crate always adds a trailing slash to root paths,
        // so strip it before joining.
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    /// The parsed base URL.
    pub fn url(&self) -> &Url {
        &self.0
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::AdminUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        // Bearer tokens only travel over HTTPS, except to a local server.
        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(InvalidInputError::AdminUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::AdminUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for AdminUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_https_and_local_http() {
        for (raw, host) in [
            ("https://api.example.com", "api.example.com"),
            ("http://127.0.0.1:5001", "127.0.0.1"),
            ("http://localhost:5001/", "localhost"),
        ] {
            assert_eq!(AdminUrl::new(raw).unwrap().host(), Some(host));
        }
    }

    #[test]
    fn endpoint_ignores_slashes_on_either_side() {
        let server = AdminUrl::new("https://api.example.com/").unwrap();
        assert_eq!(
            server.endpoint("admin/config"),
            "https://api.example.com/admin/config"
        );

        let mounted = AdminUrl::new("https://example.com/ds2api").unwrap();
        assert_eq!(
            mounted.endpoint("/admin/verify"),
            "https://example.com/ds2api/admin/verify"
        );
    }

    #[test]
    fn plain_http_needs_a_local_host() {
        assert!(AdminUrl::new("http://api.example.com").is_err());
        assert!(AdminUrl::new("/admin/login").is_err());
    }
}

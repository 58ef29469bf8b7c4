//! Admin API HTTP client.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace, warn};
use url::Url;

use crate::Result;
use crate::auth::{AdminKey, BearerToken};
use crate::config::ClientConfig;
use crate::error::{AuthError, Error, InvalidInputError, ProtocolError, TransportError};
use crate::types::AdminUrl;

use super::endpoints::{ADMIN_PREFIX, ErrorBody, LOGIN, LoginRequest, LoginResponse, VERIFY};
use super::request::RequestOptions;

/// Shown when the backend refuses a login without saying why.
const LOGIN_FAILED: &str = "login failed";

/// A token issued by a successful login.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub token: BearerToken,
    /// Lifetime in seconds.
    pub expires_in: i64,
    /// Advisory text the backend wants shown to the operator.
    pub message: Option<String>,
}

/// Result of checking a stored token against the backend.
#[derive(Debug)]
pub enum VerifyOutcome {
    /// The backend accepted the token.
    Valid,
    /// The backend was reached and refused the token.
    Rejected { status: u16 },
    /// The backend could not be reached; nothing is known about the token.
    NetworkFailure(TransportError),
}

/// Stateless HTTP client for the credential-bearing admin endpoints.
///
/// Clone is cheap: `reqwest::Client` pools connections behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AuthGateway {
    client: reqwest::Client,
    base_url: AdminUrl,
}

impl AuthGateway {
    /// Create a gateway for the configured server.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (for example, no
    /// TLS backend is available).
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()
            .map_err(TransportError::from)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Returns the server this gateway talks to.
    pub fn base_url(&self) -> &AdminUrl {
        &self.base_url
    }

    /// Exchange an admin key for a bearer token.
    ///
    /// The caller persists the returned grant; the gateway never stores it.
    #[instrument(skip(self, key), fields(server = %self.base_url))]
    pub async fn login(&self, key: &AdminKey) -> Result<LoginGrant> {
        let url = self.base_url.endpoint(LOGIN);
        debug!("Logging in");

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest {
                admin_key: key.expose(),
            })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let detail = Self::error_detail(response).await;
            return Err(AuthError::InvalidKey {
                detail: detail.unwrap_or_else(|| LOGIN_FAILED.to_string()),
            }
            .into());
        }
        if !status.is_success() {
            return Err(Self::status_error(response).await);
        }

        let body: LoginResponse = response.json().await?;
        if !body.success {
            return Err(AuthError::InvalidKey {
                detail: body.detail.unwrap_or_else(|| LOGIN_FAILED.to_string()),
            }
            .into());
        }

        let token = body
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProtocolError::malformed("login response has no token"))?;
        let expires_in = body
            .expires_in
            .ok_or_else(|| ProtocolError::malformed("login response has no expires_in"))?;

        debug!(expires_in, "Login accepted");
        Ok(LoginGrant {
            token: BearerToken::new(token)?,
            expires_in,
            message: body.message.filter(|m| !m.is_empty()),
        })
    }

    /// Ask the backend whether `token` is still good.
    ///
    /// Only an answer from the server counts as a rejection. A transport
    /// failure is reported separately so the caller can keep the token.
    #[instrument(skip(self, token), fields(server = %self.base_url))]
    pub async fn verify(&self, token: &BearerToken) -> VerifyOutcome {
        let url = self.base_url.endpoint(VERIFY);

        // A token that cannot even be put in a header will never verify.
        let Ok(auth) = Self::bearer(token) else {
            return VerifyOutcome::Rejected {
                status: StatusCode::UNAUTHORIZED.as_u16(),
            };
        };

        match self.client.get(&url).header(AUTHORIZATION, auth).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Token verified");
                VerifyOutcome::Valid
            }
            Ok(response) => {
                let status = response.status().as_u16();
                debug!(status, "Token rejected");
                VerifyOutcome::Rejected { status }
            }
            Err(e) => {
                warn!(error = %e, "Verify did not reach the server");
                VerifyOutcome::NetworkFailure(TransportError::from(e))
            }
        }
    }

    /// Perform `options` against `path` with `token` as bearer.
    ///
    /// The `Authorization` header is applied after the caller's headers, so
    /// it cannot be removed or replaced. A 401 answer becomes
    /// [`AuthError::Rejected`]; every other response is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not an `/admin/` path, the request
    /// cannot be sent, or the backend rejects the token.
    #[instrument(skip(self, options, token), fields(server = %self.base_url, method = %options.method))]
    pub async fn authenticated_request(
        &self,
        path: &str,
        options: RequestOptions,
        token: &BearerToken,
    ) -> Result<reqwest::Response> {
        let url = self.resolve(path)?;
        debug!(path = url.path(), "Authenticated request");

        let RequestOptions {
            method,
            mut headers,
            query,
            body,
        } = options;
        headers.insert(AUTHORIZATION, Self::bearer(token)?);

        let mut request = self.client.request(method, url).headers(headers);
        if !query.is_empty() {
            request = request.query(&query);
        }
        if let Some(ref body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        trace!(status = %status, "Admin response");

        if status == StatusCode::UNAUTHORIZED {
            warn!(path, "Token rejected by server");
            return Err(AuthError::Rejected.into());
        }

        Ok(response)
    }

    /// Decode a JSON body, turning a non-success status into a
    /// [`ProtocolError`] carrying the server's `detail`.
    pub async fn json_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }
        Ok(response.json::<T>().await?)
    }

    fn bearer(token: &BearerToken) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str())).map_err(
            |e| InvalidInputError::Header {
                name: AUTHORIZATION.to_string(),
                reason: e.to_string(),
            },
        )?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// Resolve `path` against the base URL and make sure the result is
    /// still under the base's `/admin/`.
    ///
    /// The check runs on the parsed URL, after dot segments in every
    /// spelling (`..`, `%2e%2e`, `.%2E`, backslash separators) have been
    /// collapsed.
    fn resolve(&self, path: &str) -> Result<Url> {
        let refuse = |reason: &str| -> Error {
            InvalidInputError::Path {
                value: path.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if !path.starts_with(ADMIN_PREFIX) {
            return Err(refuse("must start with /admin/"));
        }

        let url = Url::parse(&self.base_url.endpoint(path)).map_err(|e| refuse(&e.to_string()))?;

        let base = self.base_url.url();
        let prefix = format!("{}{}", base.path().trim_end_matches('/'), ADMIN_PREFIX);
        let lowered = url.path().to_ascii_lowercase();
        if url.origin() != base.origin()
            || !url.path().starts_with(&prefix)
            || lowered.contains("%2f")
            || lowered.contains("%5c")
        {
            return Err(refuse("must stay under /admin/"));
        }

        Ok(url)
    }

    async fn status_error(response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let detail = Self::error_detail(response).await;
        Error::Protocol(ProtocolError::status(status, detail))
    }

    async fn error_detail(response: reqwest::Response) -> Option<String> {
        // Error bodies are best-effort; a non-JSON body yields no detail.
        response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(ErrorBody::detail_text)
    }
}

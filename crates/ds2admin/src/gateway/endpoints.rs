//! Admin API endpoint definitions and request/response types.

use serde::{Deserialize, Serialize};

// ============================================================================
// Endpoint Paths
// ============================================================================

/// Exchange an admin key for a bearer token.
pub const LOGIN: &str = "/admin/login";

/// Check a bearer token.
pub const VERIFY: &str = "/admin/verify";

/// Fetch the admin configuration.
pub const CONFIG: &str = "/admin/config";

/// Prefix every authenticated admin path must carry.
pub(crate) const ADMIN_PREFIX: &str = "/admin/";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for login.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub admin_key: &'a str,
}

/// Response from login.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Error body returned by the admin API on failure.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// The detail as display text. Validation failures carry structured
    /// detail, which is rendered as JSON.
    pub fn detail_text(self) -> Option<String> {
        match self.detail? {
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

/// Admin configuration as returned by `/admin/config`.
///
/// Entries are kept as raw JSON; the console only counts them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub keys: Vec<serde_json::Value>,
    #[serde(default)]
    pub accounts: Vec<serde_json::Value>,
}

impl AdminConfig {
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_request_shape() {
        let body = serde_json::to_value(LoginRequest { admin_key: "k" }).unwrap();
        assert_eq!(body, json!({ "admin_key": "k" }));
    }

    #[test]
    fn login_response_tolerates_missing_fields() {
        let resp: LoginResponse = serde_json::from_value(json!({ "detail": "nope" })).unwrap();
        assert!(!resp.success);
        assert!(resp.token.is_none());
        assert_eq!(resp.detail.as_deref(), Some("nope"));
    }

    #[test]
    fn error_body_renders_structured_detail() {
        let body: ErrorBody =
            serde_json::from_value(json!({ "detail": [{ "msg": "field required" }] })).unwrap();
        assert_eq!(
            body.detail_text().as_deref(),
            Some(r#"[{"msg":"field required"}]"#)
        );
    }

    #[test]
    fn admin_config_counts() {
        let config: AdminConfig = serde_json::from_value(json!({
            "keys": ["sk-1", "sk-2"],
            "accounts": [{ "email": "a@example.com" }],
            "extra": true
        }))
        .unwrap();
        assert_eq!(config.key_count(), 2);
        assert_eq!(config.account_count(), 1);

        let empty: AdminConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty, AdminConfig::default());
    }
}

// Responsible for all communication with the hosted backend (PostgREST data API + GoTrue auth).

use crate::domain::auth::Session;
use crate::error::StoreError;
use crate::infra::config::SupabaseConfig;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;

/// Client for one hosted project.
///
/// Created once at startup and shared; it owns the signed-in session, so every
/// request made through it carries the same identity.
pub struct SupabaseClient {
    pub(crate) http: reqwest::Client,
    base_url: String,
    anon_key: String,
    pub(crate) session: RwLock<Option<Session>>,
}

impl SupabaseClient {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            session: RwLock::new(None),
        })
    }

    pub fn from_config(config: &SupabaseConfig) -> Result<Self, StoreError> {
        Self::new(config.url.clone(), config.anon_key.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Access token of the held session, or the anon key when signed out.
    pub(crate) async fn bearer(&self) -> String {
        let session = self.session.read().await;
        session
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.anon_key.clone())
    }

    pub(crate) fn request(&self, method: Method, url: &str, bearer: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    /// Replaces the held session (e.g. one restored from disk).
    pub async fn set_session(&self, session: Option<Session>) {
        let mut held = self.session.write().await;
        *held = session;
    }
}

/// Error body of either API; PostgREST uses `message`, GoTrue `msg` or `error_description`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<JsonValue>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Passes 2xx responses through; turns anything else into `StoreError::Rejected`.
pub(crate) async fn check(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    Err(rejection(status.as_u16(), &text))
}

pub(crate) fn rejection(status: u16, text: &str) -> StoreError {
    let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();
    let code = body.error_code.or_else(|| {
        body.code.and_then(|c| match c {
            JsonValue::String(s) => Some(s),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        })
    });
    let message = body
        .message
        .or(body.msg)
        .or(body.error_description)
        .or(body.error)
        .unwrap_or_else(|| {
            if text.is_empty() {
                format!("HTTP {}", status)
            } else {
                text.to_string()
            }
        });
    StoreError::Rejected {
        status,
        code,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_trimmed_base() {
        let client = SupabaseClient::new("https://xyz.supabase.co/", "anon").unwrap();
        assert_eq!(
            client.rest_url("grocery_lists"),
            "https://xyz.supabase.co/rest/v1/grocery_lists"
        );
        assert_eq!(
            client.auth_url("/token"),
            "https://xyz.supabase.co/auth/v1/token"
        );
    }

    #[test]
    fn postgrest_error_body_is_decoded() {
        let err = rejection(
            409,
            r#"{"code":"23503","details":"Key is not present","hint":null,"message":"violates foreign key constraint"}"#,
        );
        match err {
            StoreError::Rejected { status, code, message } => {
                assert_eq!(status, 409);
                assert_eq!(code.as_deref(), Some("23503"));
                assert_eq!(message, "violates foreign key constraint");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn gotrue_error_body_is_decoded() {
        let err = rejection(
            400,
            r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#,
        );
        assert!(matches!(
            err,
            StoreError::Rejected { code: Some(ref c), ref message, .. }
                if c == "invalid_credentials" && message == "Invalid login credentials"
        ));
    }

    #[test]
    fn non_json_error_body_is_kept_verbatim() {
        let err = rejection(502, "Bad Gateway");
        assert!(matches!(err, StoreError::Rejected { ref message, .. } if message == "Bad Gateway"));
        let err = rejection(500, "");
        assert!(matches!(err, StoreError::Rejected { ref message, .. } if message == "HTTP 500"));
    }
}

//! Identity types returned by the auth provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl User {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            email: None,
            role: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Proof of identity held by the client between requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Fills `expires_at` from `expires_in` when the issuer only sent the latter.
    pub fn anchored_at(mut self, issued: DateTime<Utc>) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = self.expires_in.map(|secs| issued.timestamp() + secs);
        }
        self
    }

    /// A session without an expiry never expires.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |at| at <= now.timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn session(expires_in: Option<i64>, expires_at: Option<i64>) -> Session {
        Session {
            access_token: "token".into(),
            refresh_token: None,
            token_type: "bearer".into(),
            expires_in,
            expires_at,
            user: User::new(Uuid::nil()),
        }
    }

    #[test]
    fn expiry_is_anchored_to_issue_time() {
        let issued = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let s = session(Some(3600), None).anchored_at(issued);
        assert_eq!(s.expires_at, Some(1_700_003_600));
        assert!(!s.is_expired(issued));
        assert!(s.is_expired(Utc.timestamp_opt(1_700_003_600, 0).unwrap()));
    }

    #[test]
    fn explicit_expiry_is_kept() {
        let issued = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let s = session(Some(3600), Some(42)).anchored_at(issued);
        assert_eq!(s.expires_at, Some(42));
    }

    #[test]
    fn session_without_expiry_never_expires() {
        assert!(!session(None, None).is_expired(Utc::now()));
    }

    #[test]
    fn token_response_decodes() {
        let body = json!({
            "access_token": "abc",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "def",
            "user": { "id": "2b7d3c9e-4f0a-4b8e-9c51-3a8f2e6d7b10", "aud": "authenticated", "email": "a@b.c" }
        });
        let s: Session = serde_json::from_value(body).unwrap();
        assert_eq!(s.user.email.as_deref(), Some("a@b.c"));
        assert_eq!(s.refresh_token.as_deref(), Some("def"));
    }
}

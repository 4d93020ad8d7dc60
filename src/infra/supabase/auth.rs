//! GoTrue auth API: password sign-in, sign-up, sign-out and session refresh.

use super::client::{check, SupabaseClient};
use crate::domain::auth::{Session, User};
use crate::error::StoreError;
use crate::storage::AuthProvider;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info, warn};

impl SupabaseClient {
    /// Signs in with email and password and holds the resulting session.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, StoreError> {
        let session = self
            .token_grant("password", json!({ "email": email, "password": password }))
            .await?;
        info!(user_id = %session.user.id, "signed in");
        self.set_session(Some(session.clone())).await;
        Ok(session)
    }

    /// Registers a new account. Returns the session when the project auto-confirms sign-ups.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, StoreError> {
        let bearer = self.bearer().await;
        let resp = self
            .request(Method::POST, &self.auth_url("signup"), &bearer)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body: JsonValue = check(resp).await?.json().await?;
        if body.get("access_token").is_none() {
            info!(email, "sign-up pending confirmation");
            return Ok(None);
        }
        let session = serde_json::from_value::<Session>(body)?.anchored_at(Utc::now());
        self.set_session(Some(session.clone())).await;
        Ok(Some(session))
    }

    /// Revokes the held session. The local session is dropped even if revocation fails.
    pub async fn sign_out(&self) -> Result<(), StoreError> {
        let held = self.session.write().await.take();
        let Some(session) = held else {
            return Ok(());
        };
        let resp = self
            .request(Method::POST, &self.auth_url("logout"), &session.access_token)
            .send()
            .await?;
        check(resp).await?;
        info!(user_id = %session.user.id, "signed out");
        Ok(())
    }

    /// Exchanges the held refresh token for a new session.
    pub async fn refresh_session(&self) -> Result<Option<Session>, StoreError> {
        let refresh_token = {
            let held = self.session.read().await;
            held.as_ref().and_then(|s| s.refresh_token.clone())
        };
        let Some(refresh_token) = refresh_token else {
            self.set_session(None).await;
            return Ok(None);
        };
        match self
            .token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
        {
            Ok(session) => {
                debug!(user_id = %session.user.id, "session refreshed");
                self.set_session(Some(session.clone())).await;
                Ok(Some(session))
            }
            Err(e) => {
                self.set_session(None).await;
                Err(e)
            }
        }
    }

    async fn token_grant(&self, grant_type: &str, body: JsonValue) -> Result<Session, StoreError> {
        let bearer = self.bearer().await;
        let resp = self
            .request(Method::POST, &self.auth_url("token"), &bearer)
            .query(&[("grant_type", grant_type)])
            .json(&body)
            .send()
            .await?;
        let session: Session = check(resp).await?.json().await?;
        Ok(session.anchored_at(Utc::now()))
    }
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn current_user(&self) -> Result<Option<User>, StoreError> {
        let Some(session) = self.current_session().await? else {
            return Ok(None);
        };
        let resp = self
            .request(Method::GET, &self.auth_url("user"), &session.access_token)
            .send()
            .await?;
        if matches!(resp.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            warn!(status = %resp.status(), "held session was not accepted");
            return Ok(None);
        }
        let user: User = check(resp).await?.json().await?;
        Ok(Some(user))
    }

    async fn current_session(&self) -> Result<Option<Session>, StoreError> {
        let held = self.session.read().await.clone();
        match held {
            Some(session) if session.is_expired(Utc::now()) => self.refresh_session().await,
            other => Ok(other),
        }
    }
}

//! Auth provider for the local backends, where there is no identity service.

use crate::domain::auth::{Session, User};
use crate::error::StoreError;
use crate::storage::AuthProvider;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

/// Holds an optional signed-in user in process memory.
///
/// A signed-in user also has a session whose token is a placeholder; nothing
/// downstream inspects it.
#[derive(Default)]
pub struct LocalAuth {
    user: RwLock<Option<User>>,
}

impl LocalAuth {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user: User) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }

    pub async fn sign_in_as(&self, user: User) {
        info!(user_id = %user.id, "local sign-in");
        *self.user.write().await = Some(user);
    }

    pub async fn sign_out(&self) {
        *self.user.write().await = None;
    }
}

#[async_trait]
impl AuthProvider for LocalAuth {
    async fn current_user(&self) -> Result<Option<User>, StoreError> {
        Ok(self.user.read().await.clone())
    }

    async fn current_session(&self) -> Result<Option<Session>, StoreError> {
        let user = self.user.read().await.clone();
        Ok(user.map(|user| Session {
            access_token: format!("local-{}", user.id),
            refresh_token: None,
            token_type: "bearer".to_string(),
            expires_in: None,
            expires_at: None,
            user,
        }))
    }
}

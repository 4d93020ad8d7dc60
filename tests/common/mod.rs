#![allow(dead_code)]

use async_trait::async_trait;
use grocery_share::{AuthProvider, GroceryService, LocalAuth, MemoryStore, Session, StoreError, User};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Auth provider whose lookups always fail, like an unreachable auth server.
#[derive(Default)]
pub struct FailingAuth {
    pub calls: AtomicUsize,
}

#[async_trait]
impl AuthProvider for FailingAuth {
    async fn current_user(&self) -> Result<Option<User>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Rejected {
            status: 503,
            code: None,
            message: "auth unavailable".into(),
        })
    }

    async fn current_session(&self) -> Result<Option<Session>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Rejected {
            status: 503,
            code: None,
            message: "auth unavailable".into(),
        })
    }
}

pub struct Fixture {
    pub service: GroceryService,
    pub store: Arc<MemoryStore>,
    pub auth: Arc<LocalAuth>,
}

pub fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let auth = Arc::new(LocalAuth::anonymous());
    let service = GroceryService::new(store.clone(), auth.clone());
    Fixture {
        service,
        store,
        auth,
    }
}

pub fn user() -> User {
    User::new(Uuid::new_v4())
}

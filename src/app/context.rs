//! Startup wiring: builds the store client once and hands it to the service and router.

use crate::app::grocery_service::GroceryService;
use crate::domain::auth::User;
use crate::error::{ConfigError, StoreError};
use crate::infra::config::{self, Backend};
use crate::infra::{LocalAuth, SupabaseClient};
use crate::storage::{AuthProvider, MemoryStore, PostgresStore};
use crate::transport::navigation::Router;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Everything a front-end needs, sharing one store client.
#[derive(Clone)]
pub struct AppContext {
    pub backend: Backend,
    pub service: GroceryService,
    pub router: Router,
    /// Set for the hosted backend, so callers can sign in and out.
    pub supabase: Option<Arc<SupabaseClient>>,
}

impl AppContext {
    /// Builds the context described by the environment (see [`crate::infra::config`]).
    pub async fn from_env() -> Result<Self, StartupError> {
        let backend = config::backend()?;
        let base_path = config::base_path();

        let (service, supabase) = match backend {
            Backend::Supabase => {
                let client = Arc::new(SupabaseClient::from_config(&config::supabase()?)?);
                if let Some((email, password)) = config::credentials() {
                    client.sign_in_with_password(&email, &password).await?;
                }
                (GroceryService::from_client(client.clone()), Some(client))
            }
            Backend::Postgres => {
                let store = PostgresStore::connect(&config::database_url()?).await?;
                store.migrate().await?;
                (GroceryService::new(Arc::new(store), local_auth()?), None)
            }
            Backend::Memory => (
                GroceryService::new(Arc::new(MemoryStore::new()), local_auth()?),
                None,
            ),
        };

        let router = Router::new(service.auth().clone()).with_base_path(base_path);
        info!(?backend, "application context ready");
        Ok(Self {
            backend,
            service,
            router,
            supabase,
        })
    }
}

fn local_auth() -> Result<Arc<dyn AuthProvider>, ConfigError> {
    let auth = match config::local_user_id()? {
        Some(id) => LocalAuth::signed_in(User::new(id)),
        None => LocalAuth::anonymous(),
    };
    Ok(Arc::new(auth))
}

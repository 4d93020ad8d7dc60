//! Remote store seams: table access and authentication.
//!
//! The grocery service only ever talks to these two traits, so the hosted
//! backend, a self-hosted Postgres and the in-memory store are interchangeable.

use crate::domain::auth::{Session, User};
use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

pub mod memory;
pub mod postgres;
pub mod query;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use query::{Filter, OrderBy, SelectQuery, UpdateQuery};

/// Table-scoped reads and writes.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Inserts every record as one batch and returns the stored rows.
    ///
    /// Either all records are stored or none are.
    async fn insert(&self, table: &str, records: Vec<JsonValue>) -> Result<Vec<JsonValue>, StoreError>;

    async fn select(&self, query: &SelectQuery) -> Result<Vec<JsonValue>, StoreError>;

    /// Applies the patch to every matching row and returns the updated rows.
    async fn update(&self, query: &UpdateQuery) -> Result<Vec<JsonValue>, StoreError>;

    /// Runs `query` and unwraps exactly one row.
    async fn select_single(&self, query: &SelectQuery) -> Result<JsonValue, StoreError> {
        let mut rows = self.select(query).await?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            0 => Err(StoreError::NoRows {
                table: query.table.clone(),
            }),
            count => Err(StoreError::MultipleRows {
                table: query.table.clone(),
                count,
            }),
        }
    }
}

/// Session state of the current client.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The signed-in user. `Ok(None)` when nobody is signed in.
    async fn current_user(&self) -> Result<Option<User>, StoreError>;

    /// The active session. `Ok(None)` when there is none.
    async fn current_session(&self) -> Result<Option<Session>, StoreError>;
}

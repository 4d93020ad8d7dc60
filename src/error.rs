//! Error types shared by the store adapters and the grocery service.

use thiserror::Error;

/// Failure reported by a table store or auth provider.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Could not decode store response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Store rejected the request ({status}): {message}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("No rows matched in '{table}'")]
    NoRows { table: String },

    #[error("Expected a single row from '{table}', got {count}")]
    MultipleRows { table: String, count: usize },

    #[error("Unknown table '{0}'")]
    UnknownTable(String),

    #[error("Unknown column '{column}' on '{table}'")]
    UnknownColumn { table: String, column: String },
}

impl StoreError {
    pub(crate) fn rejected(status: u16, message: impl Into<String>) -> Self {
        StoreError::Rejected {
            status,
            code: None,
            message: message.into(),
        }
    }
}

/// Errors surfaced by [`crate::GroceryService`] operations.
#[derive(Error, Debug)]
pub enum GroceryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No row in '{table}' with id {id}")]
    Lookup { table: String, id: String },

    #[error("Unauthorized: list {list_id} does not belong to you")]
    Unauthorized { list_id: String },

    #[error("Authentication required")]
    AuthRequired,
}

/// Missing or malformed environment configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable {0}. Please check your .env file.")]
    Missing(&'static str),

    #[error("Invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

pub mod app;
pub mod domain;
pub mod error;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{AppContext, GroceryService};
pub use domain::auth::{Session, User};
pub use domain::model::{reverse_name, GroceryItem, GroceryList, ListWithItems, NewItem, NewList};
pub use error::{ConfigError, GroceryError, StoreError};
pub use infra::{LocalAuth, SupabaseClient};
pub use storage::{AuthProvider, MemoryStore, PostgresStore, TableStore};
pub use transport::navigation::{Navigation, Router};

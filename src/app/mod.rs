pub mod context;
pub mod grocery_service;

pub use context::{AppContext, StartupError};
pub use grocery_service::GroceryService;

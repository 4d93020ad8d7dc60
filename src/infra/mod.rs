pub mod config;
pub mod local_auth;
pub mod logging;
pub mod supabase;

pub use local_auth::LocalAuth;
pub use supabase::SupabaseClient;

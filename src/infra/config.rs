//! Centralized configuration (environment variables + defaults).
//!
//! Binaries call `dotenv::dotenv()` first, so a `.env` file works too.

use crate::error::ConfigError;
use std::str::FromStr;
use uuid::Uuid;

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

/// Which store implementation the binaries wire up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Supabase,
    Postgres,
    Memory,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "supabase" => Ok(Backend::Supabase),
            "postgres" => Ok(Backend::Postgres),
            "memory" => Ok(Backend::Memory),
            _ => Err(ConfigError::Invalid {
                name: "GROCERY_BACKEND",
                value: s.to_string(),
            }),
        }
    }
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

/// Hosted project URL (required for the `supabase` backend).
pub fn supabase_url() -> Result<String, ConfigError> {
    required("SUPABASE_URL")
}

/// Public anon key of the hosted project (required for the `supabase` backend).
pub fn supabase_anon_key() -> Result<String, ConfigError> {
    required("SUPABASE_ANON_KEY")
}

pub fn supabase() -> Result<SupabaseConfig, ConfigError> {
    Ok(SupabaseConfig {
        url: supabase_url()?,
        anon_key: supabase_anon_key()?,
    })
}

/// Database URL for the `postgres` backend. No default, for safety.
pub fn database_url() -> Result<String, ConfigError> {
    required("DATABASE_URL")
}

/// `GROCERY_BACKEND`, defaulting to the hosted backend.
pub fn backend() -> Result<Backend, ConfigError> {
    optional("GROCERY_BACKEND").map_or(Ok(Backend::Supabase), |v| v.parse())
}

/// Email/password pair to sign in with, if both are set.
pub fn credentials() -> Option<(String, String)> {
    Some((optional("GROCERY_EMAIL")?, optional("GROCERY_PASSWORD")?))
}

/// Fixed signed-in user for the local backends.
pub fn local_user_id() -> Result<Option<Uuid>, ConfigError> {
    match optional("GROCERY_USER_ID") {
        None => Ok(None),
        Some(v) => Uuid::parse_str(v.trim())
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                name: "GROCERY_USER_ID",
                value: v,
            }),
    }
}

/// Prefix the router strips before matching paths.
pub fn base_path() -> String {
    optional("GROCERY_BASE_PATH").unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_parse_case_insensitively() {
        assert_eq!("Supabase".parse::<Backend>().unwrap(), Backend::Supabase);
        assert_eq!(" postgres ".parse::<Backend>().unwrap(), Backend::Postgres);
        assert_eq!("MEMORY".parse::<Backend>().unwrap(), Backend::Memory);
        assert!(matches!(
            "sqlite".parse::<Backend>(),
            Err(ConfigError::Invalid { name: "GROCERY_BACKEND", .. })
        ));
    }
}

pub mod auth;
pub mod client;
pub mod rest;

pub use client::SupabaseClient;

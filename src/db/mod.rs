//! Database module for Chirp server
//!
//! Storage traits used by the auth and feed layers, and their
//! Postgres implementation.

pub mod models;
pub mod operations;
pub mod store;

pub use models::{User, UserProfile};
pub use operations::DbOperations;
pub use store::UserStore;

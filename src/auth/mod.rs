//! Authentication module for Chirp server
//!
//! Stateless signed session tokens, bearer credential parsing,
//! password hashing and the login/registration endpoints.

pub mod bearer;
pub mod extractor;
pub mod handlers;
mod password;
mod service;
pub mod token;

pub use bearer::{bearer_from_headers, parse_bearer};
pub use extractor::Viewer;
pub use password::{hash_password, verify_password};
pub use service::{AuthService, MIN_PASSWORD_LENGTH};
pub use token::{Claims, TokenAuthenticator};

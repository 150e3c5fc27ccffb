use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::password::{hash_password, verify_password};
use super::token::TokenAuthenticator;
use crate::db::{User, UserStore};
use crate::error::{AppError, AuthError, DatabaseError};
use crate::Result;

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenAuthenticator>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenAuthenticator>) -> Self {
        Self { users, tokens }
    }

    pub fn tokens(&self) -> &TokenAuthenticator {
        &self.tokens
    }

    /// Creates the account and hands back a fresh session token.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<(User, String)> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::ValidationError(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        if self.users.get_user_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken.into());
        }

        let user = User::new(email, display_name, hash_password(password)?);
        let user = match self.users.create_user(&user).await {
            Ok(user) => user,
            // Lost a race with a concurrent registration.
            Err(AppError::DatabaseError(DatabaseError::Duplicate)) => {
                return Err(AuthError::EmailTaken.into())
            }
            Err(e) => return Err(e),
        };

        info!(user_id = %user.id, "user registered");
        let token = self.tokens.issue(&user.id.to_string());
        Ok((user, token))
    }

    /// Checks credentials and issues a session token.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String> {
        let email = normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .users
            .get_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            warn!(user_id = %user.id, "password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        info!(user_id = %user.id, "login succeeded");
        Ok(self.tokens.issue(&user.id.to_string()))
    }

    /// Recovers the viewer id from a bearer credential.
    pub fn validate_token(&self, token: &str) -> std::result::Result<Uuid, AuthError> {
        let subject = self.tokens.verify(token)?;
        Uuid::parse_str(&subject).map_err(|_| AuthError::MalformedToken)
    }
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !valid {
        return Err(AppError::ValidationError("Invalid email address".to_string()));
    }
    Ok(email)
}

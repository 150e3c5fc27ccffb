use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::AuthError;

const SCHEME: &str = "bearer";

/// Pulls the credential out of an `Authorization: Bearer <token>` value.
///
/// The scheme keyword is matched case-insensitively and any run of
/// whitespace around or between the parts is tolerated. A missing or empty
/// credential is reported exactly like a malformed token.
pub fn parse_bearer(value: &str) -> Result<&str, AuthError> {
    let value = value.trim();
    let split_at = value
        .find(char::is_whitespace)
        .ok_or(AuthError::MalformedToken)?;
    let (scheme, credential) = value.split_at(split_at);

    if !scheme.eq_ignore_ascii_case(SCHEME) {
        return Err(AuthError::MalformedToken);
    }

    let credential = credential.trim();
    if credential.is_empty() {
        return Err(AuthError::MalformedToken);
    }
    Ok(credential)
}

pub fn bearer_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MalformedToken)?
        .to_str()
        .map_err(|_| AuthError::MalformedToken)?;
    parse_bearer(value)
}

//! Compact HMAC-SHA256 signed session tokens.
//!
//! A token is `header.payload.signature`, each segment URL-safe base64
//! without padding. Nothing is stored server-side: every request re-checks
//! the signature and the absolute expiry, so rotating the secret is the only
//! way to revoke outstanding tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{AppError, AuthError};

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "HS256";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user id)
    pub iat: i64,    // Issued at, unix seconds
    pub exp: i64,    // Expiry, unix seconds
}

/// Issues and verifies session tokens under one signing secret.
#[derive(Clone)]
pub struct TokenAuthenticator {
    // Keyed once; every sign or verify starts from a clone.
    mac: HmacSha256,
    ttl_seconds: i64,
}

impl std::fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthenticator")
            .field("secret", &"<redacted>")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenAuthenticator {
    pub fn new(secret: impl AsRef<[u8]>, ttl_seconds: i64) -> Result<Self, AppError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(AppError::ConfigError("token secret must not be empty".to_string()));
        }
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| AppError::ConfigError(format!("unusable token secret: {}", e)))?;

        Ok(Self { mac, ttl_seconds })
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    pub fn issue(&self, subject: &str) -> String {
        self.issue_at(subject, Utc::now().timestamp())
    }

    /// Builds a token for `subject` valid over `[now, now + ttl)`.
    pub fn issue_at(&self, subject: &str, now: i64) -> String {
        let header = Header { alg: ALGORITHM.to_string() };
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_seconds),
        };

        let encoded_header = encode_segment(&header);
        let encoded_claims = encode_segment(&claims);
        let signing_input = format!("{}.{}", encoded_header, encoded_claims);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(signing_input.as_bytes()));

        format!("{}.{}", signing_input, signature)
    }

    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Returns the subject of a well-formed, correctly signed, unexpired token.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<String, AuthError> {
        self.decode_at(token, now).map(|claims| claims.sub)
    }

    /// Like [`verify_at`](Self::verify_at) but yields the full claim set.
    pub fn decode_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let mut segments = token.split('.');
        let (header, payload, signature) = match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(h), Some(p), Some(s), None) if !h.is_empty() && !p.is_empty() && !s.is_empty() => {
                (h, p, s)
            }
            _ => return Err(AuthError::MalformedToken),
        };

        // Undecodable signatures cannot match, so they count as bad signatures.
        let provided = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::BadSignature)?;
        let mut mac = self.mac();
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        // `verify_slice` compares in constant time.
        mac.verify_slice(&provided)
            .map_err(|_| AuthError::BadSignature)?;

        let header: Header = decode_segment(header)?;
        if header.alg != ALGORITHM {
            return Err(AuthError::MalformedToken);
        }
        let claims: Claims = decode_segment(payload)?;

        if now >= claims.exp {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(message);
        mac.finalize().into_bytes().to_vec()
    }

    fn mac(&self) -> HmacSha256 {
        self.mac.clone()
    }
}

fn encode_segment<T: Serialize>(value: &T) -> String {
    // Serializing these plain structs to JSON cannot fail.
    let json = serde_json::to_vec(value).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::MalformedToken)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedToken)
}

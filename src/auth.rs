//! Password hashing, token issuance and the `CurrentUser` request guard.
//!
//! Password hashes are SHA-256 over a fixed salt (the first 16 characters of
//! the secret key) followed by the password. There is no per-user salt, so
//! equal passwords share a hash; the scheme is kept only so existing stored
//! hashes keep verifying.

mod extractor;
mod service;

pub use extractor::{CurrentUser, MaybeUser};
pub use service::{NewAccount, authenticate, register, resolve_user};

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use model::ModelError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, error};

/// Number of secret key characters used as the password salt.
const SALT_LENGTH: usize = 16;

/// The contents of a JSON Web Token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to.
    pub sub: String,
    /// The time the token was issued.
    pub iat: i64,
    /// The expiry time of the token.
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    WrongCredentials,
    #[error("Could not validate credentials")]
    InvalidToken,
    #[error("Token creation error")]
    TokenCreation,
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Secret-derived material for hashing passwords and signing tokens.
#[derive(Clone)]
pub struct AuthKeys {
    salt: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for AuthKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthKeys")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl AuthKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            salt: secret.chars().take(SALT_LENGTH).collect(),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Default lifetime of issued tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Lowercase hex SHA-256 of the salt followed by `plaintext`.
    pub fn hash_password(&self, plaintext: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.salt.as_bytes());
        hasher.update(plaintext.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn verify_password(&self, plaintext: &str, hash: &str) -> bool {
        self.hash_password(plaintext) == hash
    }

    /// Signs an HS256 token for `subject` valid for `ttl`.
    pub fn create_token(&self, subject: &str, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            error!("Failed to sign token: {}", e);
            AuthError::TokenCreation
        })
    }

    /// Signs a token with the configured lifetime.
    pub fn issue_token(&self, subject: &str) -> Result<String, AuthError> {
        self.create_token(subject, self.ttl)
    }

    /// Checks signature and expiry. The subject is not resolved here.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                AuthError::InvalidToken
            })
    }
}

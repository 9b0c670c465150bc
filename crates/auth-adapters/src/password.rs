//! Argon2-based implementation of `PasswordHasher`.
//! Hashes are stored as PHC strings, so parameters travel with the hash.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use domains::{DomainError, PasswordHasher, Result};
use tracing::{error, warn};
use uuid::Uuid;

#[derive(Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        // v4 UUIDs carry 122 random bits, enough for a per-password salt.
        let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes()).map_err(|err| {
            error!(%err, "failed to encode password salt");
            DomainError::internal("could not hash password")
        })?;
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| {
                error!(%err, "password hashing failed");
                DomainError::internal("could not hash password")
            })?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(err) => {
                warn!(%err, "stored password hash is not a PHC string");
                return false;
            }
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

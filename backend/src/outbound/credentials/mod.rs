//! Password hashing adapter.
//!
//! Digests are Argon2id PHC strings (`$argon2id$v=19$...`). Hashing and
//! verification are CPU bound, so both run on Tokio's blocking pool.

use argon2::password_hash::{self, PasswordHash as PhcString, PasswordVerifier, SaltString};
use argon2::{Argon2, PasswordHasher as _};
use async_trait::async_trait;
use rand::RngCore;
use tokio::task;
use zeroize::Zeroizing;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHasher, PasswordHasherError};

/// Salt length in bytes.
const SALT_LEN: usize = 16;

/// Argon2id hasher with the crate's default cost parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    /// Create the hasher.
    pub fn new() -> Self {
        Self
    }
}

fn hashing_error(err: &impl ToString) -> PasswordHasherError {
    PasswordHasherError::hashing(err.to_string())
}

fn hash_blocking(password: &str) -> Result<PasswordHash, PasswordHasherError> {
    let mut salt = [0_u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt).map_err(|err| hashing_error(&err))?;
    let digest = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| hashing_error(&err))?;
    Ok(PasswordHash::new(digest.to_string()))
}

fn verify_blocking(password: &str, encoded: &str) -> Result<bool, PasswordHasherError> {
    let parsed = PhcString::new(encoded).map_err(|_| PasswordHasherError::malformed_hash())?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(hashing_error(&err)),
    }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        let password = Zeroizing::new(password.to_owned());
        task::spawn_blocking(move || hash_blocking(&password))
            .await
            .map_err(|err| hashing_error(&err))?
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        let password = Zeroizing::new(password.to_owned());
        let encoded = hash.as_ref().to_owned();
        task::spawn_blocking(move || verify_blocking(&password, &encoded))
            .await
            .map_err(|err| hashing_error(&err))?
    }
}

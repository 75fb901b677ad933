//! One-way credential hashing applied before a user record is handed to storage.
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`) with a
//! fresh random salt per call, so the same password never produces the same stored value.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    HashFailure(String),
}

/// Hashes [password] with Argon2id using the crate's default cost parameters
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| PasswordError::HashFailure(err.to_string()))?;

    Ok(hash.to_string())
}

// pawhaven-web/src/auth.rs
// ============================================================================
// Module: Password Hashing
// Description: Argon2id implementation of the shelter password hasher.
// Purpose: Hash and verify account passwords in PHC string form.
// Dependencies: argon2, rand, pawhaven-core
// ============================================================================

//! ## Overview
//! Passwords are hashed with Argon2id default parameters and a random
//! 16-byte salt. Stored hashes are PHC strings, so parameters travel with
//! each hash.

// ============================================================================
// SECTION: Imports
// ============================================================================

use argon2::Argon2;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as _;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use pawhaven_core::PasswordHasher;
use pawhaven_core::PasswordHasherError;
use rand::RngCore;
use rand::rngs::OsRng;

// ============================================================================
// SECTION: Hasher
// ============================================================================

/// Salt length in bytes.
const SALT_BYTES: usize = 16;

/// Argon2id password hasher.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHasherError> {
        let mut salt_bytes = [0_u8; SALT_BYTES];
        OsRng.fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|err| PasswordHasherError::Hash(err.to_string()))?;
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHasherError::Hash(err.to_string()))
    }

    fn verify(&self, password: &str, encoded: &str) -> Result<bool, PasswordHasherError> {
        let parsed = PasswordHash::new(encoded)
            .map_err(|err| PasswordHasherError::Malformed(err.to_string()))?;
        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    }
}

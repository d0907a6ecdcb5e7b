use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{Error, Result};

const ARGON2_MEMORY: u32 = 19 * 1024; // 19 MiB
const ARGON2_ITERATIONS: u32 = 2;
const ARGON2_PARALLELISM: u32 = 1;
const ARGON2_OUTPUT_LEN: usize = 32;

/// Argon2id hasher for user passwords and asset lookup keys. Produces PHC
/// strings (`$argon2id$v=19$...`) with a random salt per call.
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialHasher {
    #[must_use]
    pub fn new() -> Self {
        let params = Params::new(
            ARGON2_MEMORY,
            ARGON2_ITERATIONS,
            ARGON2_PARALLELISM,
            Some(ARGON2_OUTPUT_LEN),
        )
        .expect("invalid argon2 params");

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    pub fn hash(&self, secret: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| Error::internal("failed to hash secret", e))?;
        Ok(hash.to_string())
    }

    pub fn verify(&self, secret: &str, hash: &str) -> Result<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| Error::internal("invalid hash format", e))?;

        match self.argon2.verify_password(secret.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::internal("failed to verify secret", e)),
        }
    }

    /// External lookup key for an asset: the hash of its decimal id.
    pub fn hash_asset_id(&self, asset_id: i64) -> Result<String> {
        self.hash(&asset_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_verification_correct() {
        let hasher = CredentialHasher::new();
        let hash = hasher.hash("rahasia123").unwrap();

        assert!(hasher.verify("rahasia123", &hash).unwrap());
    }

    #[test]
    fn test_password_verification_wrong_secret() {
        let hasher = CredentialHasher::new();
        let hash = hasher.hash("rahasia123").unwrap();

        assert!(!hasher.verify("rahasia124", &hash).unwrap());
    }

    #[test]
    fn test_hash_is_phc_format() {
        let hasher = CredentialHasher::new();
        let hash = hasher.hash("x").unwrap();

        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_asset_id_hash_is_salted() {
        let hasher = CredentialHasher::new();
        let first = hasher.hash_asset_id(7).unwrap();
        let second = hasher.hash_asset_id(7).unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("7", &first).unwrap());
        assert!(hasher.verify("7", &second).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        let hasher = CredentialHasher::new();
        assert!(matches!(
            hasher.verify("x", "not-a-phc-string"),
            Err(Error::Internal(_))
        ));
    }
}

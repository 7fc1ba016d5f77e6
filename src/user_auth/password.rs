//! Argon2id password hashing.
//!
//! Hashing and verification are CPU-bound and run on the blocking pool.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::config::PasswordHashConfig;
use crate::error::ServiceError;

#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    pub fn new(config: PasswordHashConfig) -> Result<Self, ServiceError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| ServiceError::internal(format!("argon2 params: {}", e)))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash with a fresh random salt. Output is a PHC string embedding salt and cost.
    pub async fn hash(&self, password: &str) -> Result<String, ServiceError> {
        let argon2 = self.argon2();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|h| h.to_string())
                .map_err(|e| ServiceError::internal(format!("Hashing failed: {}", e)))
        })
        .await?
    }

    /// Constant-time check of `password` against a stored PHC hash.
    ///
    /// Cost parameters come from the stored hash, so rows hashed under older
    /// settings keep verifying.
    pub async fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, ServiceError> {
        let argon2 = self.argon2();
        let password = password.to_owned();
        let stored_hash = stored_hash.to_owned();
        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&stored_hash)
                .map_err(|e| ServiceError::internal(format!("Invalid hash format: {}", e)))?;
            match argon2.verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(ServiceError::internal(format!("Verify failed: {}", e))),
            }
        })
        .await?
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> CredentialHasher {
    // Minimal cost keeps the suite fast
    CredentialHasher::new(PasswordHashConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hasher = test_hasher();
        let hash = hasher.hash("pw1").await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("pw1", &hash).await.unwrap());
        assert!(!hasher.verify("pw2", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_salt_differs_per_hash() {
        let hasher = test_hasher();
        let a = hasher.hash("same").await.unwrap();
        let b = hasher.hash("same").await.unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("same", &b).await.unwrap());
    }

    #[tokio::test]
    async fn test_garbage_hash_is_internal_error() {
        let hasher = test_hasher();
        let err = hasher.verify("pw", "not-a-phc-string").await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let err = CredentialHasher::new(PasswordHashConfig {
            memory_kib: 0,
            iterations: 0,
            parallelism: 0,
        });
        assert!(err.is_err());
    }
}

//! Argon2id password hashing with a tunable work factor.

use anyhow::{anyhow, Result};
use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};

/// Work factor for the hash function.
///
/// Defaults follow the argon2 crate's recommended parameters; lowering them is
/// only appropriate in tests.
#[derive(Clone, Copy, Debug)]
pub struct HashParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// One-way hash and verify of plaintext passwords.
///
/// Each `hash` call draws a fresh random salt, so hashing the same plaintext
/// twice yields different PHC strings.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// # Errors
    ///
    /// Returns an error if the work factor parameters are out of range.
    pub fn new(params: HashParams) -> Result<Self> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|err| anyhow!("invalid argon2 parameters: {err}"))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// # Errors
    ///
    /// Returns an error if the hash computation fails.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|err| anyhow!("failed to hash password: {err}"))?;
        Ok(hash.to_string())
    }

    /// Check `plaintext` against a stored PHC hash string.
    ///
    /// A parseable hash that does not match yields `Ok(false)`. An unparseable
    /// stored hash is a configuration error, not a credential mismatch, and is
    /// surfaced as `Err`.
    ///
    /// # Errors
    ///
    /// Returns an error if `stored` is not a valid PHC hash string.
    pub fn verify(&self, plaintext: &str, stored: &str) -> Result<bool> {
        let parsed = PasswordHash::new(stored)
            .map_err(|err| anyhow!("stored password hash is malformed: {err}"))?;
        Ok(self
            .argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

/// Low-cost parameters for tests; never use outside test code.
#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(HashParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("test parameters are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() -> Result<()> {
        let hasher = test_hasher();
        let hash = hasher.hash("longenough1")?;
        assert!(hasher.verify("longenough1", &hash)?);
        Ok(())
    }

    #[test]
    fn verify_rejects_wrong_password() -> Result<()> {
        let hasher = test_hasher();
        let hash = hasher.hash("longenough1")?;
        assert!(!hasher.verify("wrongpass", &hash)?);
        Ok(())
    }

    #[test]
    fn hash_is_salted() -> Result<()> {
        let hasher = test_hasher();
        let first = hasher.hash("longenough1")?;
        let second = hasher.hash("longenough1")?;
        assert_ne!(first, second);
        Ok(())
    }

    #[test]
    fn verify_errors_on_malformed_stored_hash() {
        let hasher = test_hasher();
        assert!(hasher.verify("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        let result = PasswordHasher::new(HashParams {
            memory_kib: 0,
            iterations: 0,
            parallelism: 0,
        });
        assert!(result.is_err());
    }
}

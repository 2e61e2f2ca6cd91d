use anyhow::Context;
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::config::HashConfig;

/// Argon2id hasher with a tunable iteration count.
///
/// Verification reads the parameters embedded in the stored PHC string, so
/// hashes written under an older cost keep verifying after the cost changes.
#[derive(Clone)]
pub struct PasswordHashing {
    argon2: Argon2<'static>,
}

impl PasswordHashing {
    pub fn new(cfg: &HashConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.cost, 1, None).map_err(|e| {
            error!(error = %e, cost = cfg.cost, memory_kib = cfg.memory_kib, "invalid argon2 params");
            anyhow::anyhow!("invalid password hash parameters: {e}")
        })?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn hash_password(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
    pub fn verify_password(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            anyhow::anyhow!(e.to_string())
        })?;
        match self.argon2.verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => {
                error!(error = %e, "argon2 verify_password error");
                Err(anyhow::anyhow!(e.to_string()))
            }
        }
    }

    /// Hashes on the blocking pool. Takes the plaintext by value; it is
    /// dropped once the hash is computed.
    pub async fn hash(&self, plain: String) -> anyhow::Result<String> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.hash_password(&plain))
            .await
            .context("password hashing task failed")?
    }

    pub async fn verify(&self, plain: String, hash: String) -> anyhow::Result<bool> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.verify_password(&plain, &hash))
            .await
            .context("password verification task failed")?
    }
}

#[cfg(test)]
pub(crate) fn cheap_hashing() -> PasswordHashing {
    PasswordHashing::new(&HashConfig {
        cost: 1,
        memory_kib: 64,
    })
    .expect("cheap params are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hasher = cheap_hashing();
        let password = "Secur3P@ssw0rd!";
        let hash = hasher.hash_password(password).expect("hashing should succeed");
        assert!(hasher.verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hasher = cheap_hashing();
        let hash = hasher
            .hash_password("correct-horse-battery-staple")
            .expect("hashing should succeed");
        assert!(!hasher
            .verify_password("wrong-password", &hash)
            .expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = cheap_hashing()
            .verify_password("anything", "not-a-valid-hash")
            .unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn hash_is_salted_and_never_plaintext() {
        let hasher = cheap_hashing();
        let a = hasher.hash_password("secret1").unwrap();
        let b = hasher.hash_password("secret1").unwrap();
        assert_ne!(a, b);
        assert!(!a.contains("secret1"));
        assert!(a.starts_with("$argon2id$"));
    }

    #[test]
    fn configured_cost_is_encoded_in_hash() {
        let hasher = PasswordHashing::new(&HashConfig {
            cost: 3,
            memory_kib: 64,
        })
        .unwrap();
        let hash = hasher.hash_password("pw").unwrap();
        assert!(hash.contains("t=3"), "{hash}");
    }

    #[test]
    fn hashes_from_other_cost_still_verify() {
        let old = PasswordHashing::new(&HashConfig {
            cost: 2,
            memory_kib: 64,
        })
        .unwrap();
        let hash = old.hash_password("pw").unwrap();
        assert!(cheap_hashing().verify_password("pw", &hash).unwrap());
    }

    #[test]
    fn zero_cost_is_rejected() {
        assert!(PasswordHashing::new(&HashConfig {
            cost: 0,
            memory_kib: 64,
        })
        .is_err());
    }

    #[tokio::test]
    async fn async_hash_and_verify() {
        let hasher = cheap_hashing();
        let hash = hasher.hash("secret1".to_string()).await.unwrap();
        assert!(hasher.verify("secret1".into(), hash.clone()).await.unwrap());
        assert!(!hasher.verify("secret2".into(), hash).await.unwrap());
    }
}

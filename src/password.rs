//! Password hashing with Argon2id.
//!
//! Digests are PHC strings carrying the salt and parameters, so `verify`
//! needs nothing beyond the stored value. A fresh random salt is drawn per
//! call, which means hashing the same password twice never produces the same
//! digest.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a plaintext password into a PHC string.
///
/// # Errors
/// Returns an error if the underlying hash computation fails.
pub fn hash(plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?;
    Ok(digest.to_string())
}

/// Verify a plaintext password against a stored PHC string.
///
/// Comparison inside Argon2 is constant time. A malformed digest is treated
/// as a mismatch rather than an error, so callers always fail closed.
#[must_use]
pub fn verify(plaintext: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

/// Burn roughly the same CPU as a real verification.
///
/// Used on login for unknown emails so response timing does not reveal
/// whether an account exists.
pub fn verify_dummy(plaintext: &str) {
    // Digest of an arbitrary string; the result is always discarded.
    const DUMMY_DIGEST: &str = "$argon2id$v=19$m=19456,t=2,p=1$gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";
    let _ = verify(plaintext, DUMMY_DIGEST);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() -> Result<()> {
        let digest = hash("hunter2")?;
        assert!(verify("hunter2", &digest));
        assert!(!verify("hunter3", &digest));
        Ok(())
    }

    #[test]
    fn hash_is_salted_per_call() -> Result<()> {
        let first = hash("same-password")?;
        let second = hash("same-password")?;
        assert_ne!(first, second);
        assert!(verify("same-password", &first));
        assert!(verify("same-password", &second));
        Ok(())
    }

    #[test]
    fn malformed_digest_is_a_mismatch() {
        assert!(!verify("anything", ""));
        assert!(!verify("anything", "not-a-phc-string"));
        assert!(!verify("anything", "$argon2id$v=19$truncated"));
    }

    #[test]
    fn dummy_verify_does_not_panic() {
        verify_dummy("whatever");
    }
}

//! Password-based key derivation using PBKDF2-HMAC-SHA512.
//!
//! The same primitive backs both envelope keys and the stored password
//! hash, so one derivation cost applies everywhere.  The iteration count
//! is fixed; stored password configs record it so a future change can
//! still verify old configs.

use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::RngCore;
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::errors::{CredSwapError, Result};

/// PBKDF2 iteration count for every derivation.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Length of every salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Name recorded in password configs for this derivation.
pub const ALGORITHM: &str = "pbkdf2-sha512";

/// Derive a 32-byte key from a password and salt with the default
/// iteration count.
pub fn derive_key(password: &[u8], salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    derive_key_with_iterations(password, salt, PBKDF2_ITERATIONS)
}

/// Derive a 32-byte key with an explicit iteration count.
///
/// The key is returned in a `Zeroizing` wrapper so it is wiped on drop.
pub fn derive_key_with_iterations(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    if iterations < 1 {
        return Err(CredSwapError::KeyDerivationFailed(
            "PBKDF2 iterations must be at least 1".into(),
        ));
    }

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::<Hmac<Sha512>>(password, salt, iterations, &mut key[..])
        .map_err(|e| CredSwapError::KeyDerivationFailed(format!("PBKDF2 failed: {e}")))?;

    Ok(key)
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_same_key() {
        let salt = [7u8; SALT_LEN];
        let a = derive_key_with_iterations(b"hunter2", &salt, 1_000).unwrap();
        let b = derive_key_with_iterations(b"hunter2", &salt, 1_000).unwrap();
        assert_eq!(*a, *b);
    }

    #[test]
    fn different_salt_different_key() {
        let a = derive_key_with_iterations(b"hunter2", &[1u8; SALT_LEN], 1_000).unwrap();
        let b = derive_key_with_iterations(b"hunter2", &[2u8; SALT_LEN], 1_000).unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn iteration_count_changes_key() {
        let salt = [3u8; SALT_LEN];
        let a = derive_key_with_iterations(b"pw", &salt, 1_000).unwrap();
        let b = derive_key_with_iterations(b"pw", &salt, 1_001).unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn zero_iterations_rejected() {
        assert!(derive_key_with_iterations(b"pw", &[0u8; SALT_LEN], 0).is_err());
    }

    #[test]
    fn salts_are_random() {
        assert_ne!(generate_salt(), generate_salt());
    }
}

//! Salted password hashing.
//!
//! Stored format is `v1$<salt_hex>$<digest_hex>` where the digest is
//! SHA-256 over salt followed by the password bytes. The scheme tag
//! leaves room to migrate stored hashes later.

use rand::RngCore;
use sha2::{Digest, Sha256};

const SCHEME: &str = "v1";
const SALT_BYTES: usize = 16;

/// Hash a password with a fresh random salt.
pub fn hash(password: &str) -> String {
    let mut salt = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt);

    let digest = digest_with_salt(&salt, password);
    format!("{}${}${}", SCHEME, hex::encode(salt), hex::encode(digest))
}

/// Verify a password against a stored hash.
///
/// Malformed stored hashes verify as false rather than erroring; a
/// corrupted row must never let a login through.
pub fn verify(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(salt_hex), Some(digest_hex), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    if scheme != SCHEME {
        return false;
    }

    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };

    let digest = digest_with_salt(&salt, password);
    constant_time_eq(&digest, &expected)
}

fn digest_with_salt(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b) {
        diff |= x ^ y;
    }
    diff == 0
}

//! Salted, iterated SHA-256 password hashing.
//!
//! Stored form is `<salt-hex>$<digest-hex>`. Plaintext never leaves this
//! module except as the caller's own argument.

use sha2::{Digest, Sha256};

use super::generator::generate_hex;

/// Salt byte length before hex encoding
const SALT_BYTES: usize = 16;

/// Number of SHA-256 iterations for password stretching
const HASH_ITERATIONS: u32 = 100_000;

/// Salt used to burn the same amount of work when a user does not exist
const DUMMY_SALT: &str = "00000000000000000000000000000000";

/// Hash a password under a fresh random salt
pub fn hash_password(password: &str) -> Result<String, rand::Error> {
    let salt = generate_hex(SALT_BYTES)?;
    let digest = stretch(password, &salt);
    Ok(format!("{salt}${digest}"))
}

/// Check a password against a stored `<salt>$<digest>` string in constant time.
///
/// A malformed stored hash never verifies.
pub fn verify_password(password: &str, secret_hash: &str) -> bool {
    let Some((salt, expected)) = secret_hash.split_once('$') else {
        return false;
    };
    let attempt = stretch(password, salt);
    constant_time_eq(attempt.as_bytes(), expected.as_bytes())
}

/// Do the work of one verification without a stored hash.
///
/// Called on unknown usernames so that the response time does not reveal
/// whether the account exists.
pub fn burn_verification(password: &str) {
    let _ = stretch(password, DUMMY_SALT);
}

fn stretch(password: &str, salt: &str) -> String {
    let mut hash = Sha256::new();
    hash.update(salt.as_bytes());
    hash.update(password.as_bytes());
    let mut result = hash.finalize();

    for _ in 1..HASH_ITERATIONS {
        let mut h = Sha256::new();
        h.update(result);
        h.update(salt.as_bytes());
        result = h.finalize();
    }

    hex::encode(result)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

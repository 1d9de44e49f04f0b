//! Shared client token verification.
//!
//! Tokens are reduced to fixed-length SHA-256 digests and compared in
//! constant time, so neither length nor content of the secret leaks through
//! response timing.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

/// Check a presented token against the configured secret.
///
/// A missing or empty presented token never verifies.
pub fn verify_client_token(presented: Option<&str>, expected: &str) -> bool {
    match presented {
        Some(token) if !token.is_empty() && !expected.is_empty() => {
            digest(token).ct_eq(&digest(expected)).into()
        }
        _ => false,
    }
}

/// Short, log-safe fingerprint of a presented token.
pub fn token_fingerprint(token: &str) -> String {
    let hash = hex::encode(digest(token));
    hash[..8].to_string()
}

//! Password Hashing
//! Mission: One-way salted hashing and constant-time verification (bcrypt)

use anyhow::{Context, Result};
use tracing::debug;

pub use bcrypt::DEFAULT_COST;

/// Hash a plaintext password with a fresh salt.
pub fn hash(plaintext: &str, cost: u32) -> Result<String> {
    bcrypt::hash(plaintext, cost).context("Failed to hash password")
}

/// Check a plaintext password against a stored digest.
///
/// A digest that cannot be parsed verifies as `false`.
pub fn verify(plaintext: &str, digest: &str) -> bool {
    match bcrypt::verify(plaintext, digest) {
        Ok(valid) => valid,
        Err(e) => {
            debug!("Stored password digest rejected: {}", e);
            false
        }
    }
}

/// [`hash`] on the blocking pool; bcrypt is deliberately slow.
pub async fn hash_blocking(plaintext: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || hash(&plaintext, cost))
        .await
        .context("password hashing task failed")?
}

/// [`verify`] on the blocking pool.
pub async fn verify_blocking(plaintext: String, digest: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify(&plaintext, &digest))
        .await
        .context("password verification task failed")
}

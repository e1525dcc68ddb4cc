//! Content identity of images.
//!
//! An image is identified by the SHA-256 digest of its file bytes, the same
//! digest the server computes on upload. When no digest can be computed a
//! timestamp-derived fallback is used; fallback identities change on every
//! load, so annotations saved under them cannot be found again.

use sha2::{Digest, Sha256};

/// Prefix of fallback identities.
pub const FALLBACK_PREFIX: &str = "fallback_";

/// Hex-encoded SHA-256 of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Content hash of `bytes`, or a fallback identity when there are none.
pub fn content_hash_or_fallback(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        log::warn!("No image bytes to hash, using fallback identity");
        return fallback_hash();
    }
    content_hash(bytes)
}

/// Non-stable identity derived from the current time.
pub fn fallback_hash() -> String {
    let millis = web_time::SystemTime::now()
        .duration_since(web_time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    format!("{}{}", FALLBACK_PREFIX, millis)
}

/// Check whether `hash` is a fallback identity.
pub fn is_fallback(hash: &str) -> bool {
    hash.starts_with(FALLBACK_PREFIX)
}

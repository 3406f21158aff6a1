//! Cache key generation.

use sha2::{Digest, Sha256};

/// Compute the storage key for a request.
///
/// Only GET responses are ever stored, but the method stays part of the key
/// so the layout does not change if that is relaxed later.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

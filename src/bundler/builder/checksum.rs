//! Content fingerprints for production assets.
//!
//! A fingerprint is the SHA-1 digest of an asset's final bytes, hex-encoded.
//! It names the asset on disk and in `app.html`, so identical content always
//! maps to the identical file name.

use sha1::{Digest, Sha1};

/// Calculates the fingerprint of `bytes`.
///
/// # Returns
///
/// Lowercase hex-encoded SHA-1 digest (40 characters).
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

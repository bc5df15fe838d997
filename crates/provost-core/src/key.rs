//! Consumer-key hashing for the indexed lookup column.
//!
//! Platform keys can be arbitrarily long (a tool-proxy registration may
//! use a whole URL), but the lookup column is indexable text. Keys that
//! fit are used verbatim; longer ones are replaced by a fixed-length
//! digest. The raw key is persisted separately only when hashing actually
//! changed it, so an equality check against the raw column can reject
//! digest collisions.

use sha2::{Digest, Sha512};

/// Longest key stored verbatim in the lookup column.
pub const MAX_PLAIN_KEY_LEN: usize = 255;

/// Lookup form of a consumer key.
pub fn lookup_key(key: &str) -> String {
    if key.len() <= MAX_PLAIN_KEY_LEN {
        key.to_owned()
    } else {
        format!("sha512:{}", hex::encode(Sha512::digest(key.as_bytes())))
    }
}

/// Value for the raw-key column: `None` when the lookup form already is
/// the key, so the hash doubles as the key and nothing is stored twice.
pub fn raw_key_column(key: &str) -> Option<&str> {
    if lookup_key(key) == key {
        None
    } else {
        Some(key)
    }
}

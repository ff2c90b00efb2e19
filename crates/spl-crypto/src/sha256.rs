//! # SHA-256 Digest Computation
//!
//! `sha256_hex(data: &CanonicalBytes)` only accepts canonical bytes, so a
//! reported payload digest always refers to the exact signed message.

use sha2::{Digest, Sha256};
use spl_core::CanonicalBytes;

/// Lowercase hex SHA-256 of canonical bytes.
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    hex(&Sha256::digest(data.as_bytes()))
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        // {"a":1}
        let cb = CanonicalBytes::new(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(
            sha256_hex(&cb),
            "015abd7f5cc57a2dd94b7590f04ad8084273905ee33ec5cebeae62276a97f862"
        );
    }

    #[test]
    fn test_digest_is_order_independent() {
        let a = CanonicalBytes::new(&serde_json::json!({"x": 1, "y": [1, 2]})).unwrap();
        let b = CanonicalBytes::new(&serde_json::json!({"y": [1, 2], "x": 1})).unwrap();
        assert_eq!(sha256_hex(&a), sha256_hex(&b));
        assert_eq!(sha256_hex(&a).len(), 64);
    }
}

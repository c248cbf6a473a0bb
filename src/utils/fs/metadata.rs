//! Content checksums for imported artifacts.

use sha2::{Digest, Sha256};

/// SHA-256 of `content` as a 64-character lowercase hex string.
#[must_use]
pub fn checksum_bytes(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_bytes_known_value() {
        assert_eq!(
            checksum_bytes(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_checksum_is_content_sensitive() {
        assert_ne!(checksum_bytes(b"<schema/>"), checksum_bytes(b"<schema />"));
        assert_eq!(checksum_bytes(b"").len(), 64);
    }
}

//! Message fingerprinting for change detection.

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of the rendered notification text.
///
/// Used purely to decide whether a freshly formatted message differs from
/// the last broadcast one; equality is plain string comparison on the hex
/// form. Collision resistance is incidental, not a security requirement.
#[must_use]
pub fn fingerprint(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write as _;
        // Writing to a String cannot fail.
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(fingerprint("schedule"), fingerprint("schedule"));
    }

    #[test]
    fn test_fingerprint_differs_on_change() {
        assert_ne!(fingerprint("schedule a"), fingerprint("schedule b"));
    }

    #[test]
    fn test_fingerprint_shape() {
        let hex = fingerprint("");
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        // Well-known SHA-256 of the empty string.
        assert_eq!(
            hex,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}

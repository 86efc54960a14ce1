//! Content fingerprinting for asset bytes.
//!
//! The digest is the change-detection key for every asset class. It is only
//! ever compared for equality, so the algorithm is an internal detail; the
//! store schema just needs a stable hex width.

/// Width of a hex-encoded content digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Fingerprint raw asset bytes as lowercase hex.
///
/// Pure and deterministic; identical bytes always produce the identical
/// digest, across runs and across machines.
#[must_use]
pub fn digest_hex(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::{DIGEST_HEX_LEN, digest_hex};

    #[test]
    fn digest_is_stable_across_calls() {
        assert_eq!(digest_hex(b"dirt"), digest_hex(b"dirt"));
    }

    #[test]
    fn digest_distinguishes_content() {
        assert_ne!(digest_hex(b"dirt"), digest_hex(b"lava"));
    }

    #[test]
    fn digest_is_lowercase_hex_of_fixed_width() {
        let hex = digest_hex(b"");
        assert_eq!(hex.len(), DIGEST_HEX_LEN);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}

//! Webhook signature utilities.
//!
//! The storage provider signs every webhook delivery with HMAC-SHA256
//! over the raw request body, keyed by the shared application secret,
//! and sends the hex digest in the `X-Provider-Signature` header.
//! This module lives in `core` (zero internal deps) so both the API
//! layer and test tooling can use it.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the hex-encoded HMAC-SHA256 signature for a webhook body.
pub fn compute_signature(secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a hex-encoded signature against the raw webhook body.
///
/// The comparison runs in constant time via [`Mac::verify_slice`], so a
/// mismatched signature leaks nothing about the expected digest. Returns
/// `false` for malformed hex as well as for a wrong digest.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Some(expected) = hex::decode(signature) else {
        return false;
    };
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

// ---------------------------------------------------------------------------
// hex helpers (no extra dep)
// ---------------------------------------------------------------------------

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Decode a hex string; `None` if the input is not valid hex.
    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 {
            return None;
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_hex_of_expected_length() {
        let sig = compute_signature("my_secret", br#"{"delta":{"users":[]}}"#);
        // SHA-256 digest: 32 bytes = 64 hex characters.
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_is_deterministic() {
        let a = compute_signature("secret", b"payload");
        let b = compute_signature("secret", b"payload");
        assert_eq!(a, b);
    }

    #[test]
    fn signature_differs_with_different_secret() {
        let a = compute_signature("secret_a", b"payload");
        let b = compute_signature("secret_b", b"payload");
        assert_ne!(a, b);
    }

    #[test]
    fn verify_accepts_matching_signature() {
        let sig = compute_signature("secret", b"body");
        assert!(verify_signature("secret", b"body", &sig));
    }

    #[test]
    fn verify_rejects_tampered_body() {
        let sig = compute_signature("secret", b"body");
        assert!(!verify_signature("secret", b"tampered", &sig));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let sig = compute_signature("secret", b"body");
        assert!(!verify_signature("other", b"body", &sig));
    }

    #[test]
    fn verify_rejects_malformed_hex() {
        assert!(!verify_signature("secret", b"body", "not-hex"));
        assert!(!verify_signature("secret", b"body", "abc"));
    }
}

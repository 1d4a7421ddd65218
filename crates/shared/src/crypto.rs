//! Cryptographic helpers for token fingerprints and random secrets.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a secure random token (32 bytes, hex encoded).
pub fn generate_secure_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// Short, log-safe fingerprint of a token: the first 12 hex chars of its SHA-256.
///
/// Session tokens are never written to logs; this is what gets written instead.
pub fn token_fingerprint(token: &str) -> String {
    let mut digest = sha256_hex(token);
    digest.truncate(12);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex("test"),
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_deterministic() {
        assert_eq!(sha256_hex("same_input"), sha256_hex("same_input"));
        assert_ne!(sha256_hex("input1"), sha256_hex("input2"));
    }

    #[test]
    fn test_generate_secure_token() {
        let token = generate_secure_token();
        // 32 bytes * 2 hex chars
        assert_eq!(token.len(), 64);
        assert!(hex::decode(&token).is_ok());
    }

    #[test]
    fn test_generate_secure_token_uniqueness() {
        assert_ne!(generate_secure_token(), generate_secure_token());
    }

    #[test]
    fn test_token_fingerprint() {
        let fp = token_fingerprint("eyJhbGciOiJIUzI1NiJ9.payload.sig");
        assert_eq!(fp.len(), 12);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp, token_fingerprint("eyJhbGciOiJIUzI1NiJ9.payload.sig"));
    }
}

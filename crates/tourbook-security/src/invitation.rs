//! Registration invitation tokens.
//!
//! The plain token only ever travels inside the invite mail; the store keeps
//! its SHA-256 digest.

use rand::RngCore;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone)]
pub struct InvitationToken {
    pub plain: String,
    pub digest: String,
}

impl InvitationToken {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        let plain = hex::encode(bytes);
        let digest = Self::digest(&plain);
        Self { plain, digest }
    }

    pub fn digest(plain: &str) -> String {
        hex::encode(Sha256::digest(plain.trim().as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_unique_and_digest_matches() {
        let a = InvitationToken::generate();
        let b = InvitationToken::generate();
        assert_ne!(a.plain, b.plain);
        assert_eq!(a.plain.len(), 64);
        assert_eq!(InvitationToken::digest(&a.plain), a.digest);
        assert_ne!(a.digest, a.plain);
    }
}

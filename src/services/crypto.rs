// SPDX-License-Identifier: MIT
// Copyright 2026 Alexey Sokolov <a.sokolov@techinnovate.ru>

//! AES-256-GCM encryption for stored OAuth tokens.
//!
//! Tokens are encrypted before they reach the credential store and decrypted
//! after they are read back; the store only ever sees opaque strings. Each
//! encryption uses a fresh random nonce, stored as a prefix of the
//! ciphertext: `base64(nonce || ciphertext)`.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::AppError;

/// GCM standard nonce size (96 bits).
const NONCE_SIZE: usize = 12;

/// Cipher for token-at-rest encryption, cheap to clone.
#[derive(Clone)]
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

impl TokenCipher {
    /// Create a cipher from a 32-byte key.
    pub fn new(key: &[u8]) -> Result<Self, AppError> {
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Encryption key must be 32 bytes")))?;
        Ok(Self { cipher })
    }

    /// Encrypt a token, returning `base64(nonce || ciphertext)`.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, AppError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Token encryption failed: {}", e)))?;

        let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        combined.extend_from_slice(&nonce);
        combined.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(combined))
    }

    /// Decrypt a token produced by [`encrypt`](Self::encrypt).
    ///
    /// Fails on a wrong key, a truncated record, or tampered ciphertext
    /// (GCM is authenticated).
    pub fn decrypt(&self, encoded: &str) -> Result<String, AppError> {
        let combined = BASE64
            .decode(encoded)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid token ciphertext: {}", e)))?;

        if combined.len() <= NONCE_SIZE {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Token ciphertext too short"
            )));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Token decryption failed")))?;

        String::from_utf8(plaintext)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Decrypted token is not UTF-8")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> TokenCipher {
        TokenCipher::new(&[0u8; 32]).unwrap()
    }

    #[test]
    fn test_roundtrip() {
        let c = cipher();
        let encrypted = c.encrypt("my-secret-access-token").unwrap();
        assert_ne!(encrypted, "my-secret-access-token");
        assert_eq!(c.decrypt(&encrypted).unwrap(), "my-secret-access-token");
    }

    #[test]
    fn test_fresh_nonce_per_encryption() {
        let c = cipher();
        let first = c.encrypt("same-plaintext").unwrap();
        let second = c.encrypt("same-plaintext").unwrap();
        assert_ne!(first, second);
        assert_eq!(c.decrypt(&first).unwrap(), "same-plaintext");
        assert_eq!(c.decrypt(&second).unwrap(), "same-plaintext");
    }

    #[test]
    fn test_wrong_key_fails() {
        let encrypted = cipher().encrypt("secret").unwrap();
        let other = TokenCipher::new(&[1u8; 32]).unwrap();
        assert!(other.decrypt(&encrypted).is_err());
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let c = cipher();
        let encrypted = c.encrypt("secret").unwrap();
        let mut bytes = BASE64.decode(&encrypted).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert!(c.decrypt(&BASE64.encode(bytes)).is_err());
    }

    #[test]
    fn test_invalid_key_length() {
        assert!(TokenCipher::new(&[0u8; 16]).is_err());
    }
}

//! Sealing of farmer private keys at rest.
//!
//! Sealed form is `hex(nonce || ciphertext)` with a fresh random 12-byte
//! nonce per seal, so the same key sealed twice never yields the same text.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{CryptoError, PrivateKey};

const NONCE_LEN: usize = 12;

#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyVault {
    key: [u8; 32],
}

impl KeyVault {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Build a vault from a hex-encoded 32-byte key.
    pub fn from_hex(key_hex: &str) -> Result<Self, CryptoError> {
        let mut bytes =
            hex::decode(key_hex.trim()).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        let result = <[u8; 32]>::try_from(bytes.as_slice())
            .map(Self::new)
            .map_err(|_| CryptoError::InvalidKeyLength {
                expected: 32,
                actual: bytes.len(),
            });
        bytes.zeroize();
        result
    }

    pub fn seal(&self, plaintext: &[u8]) -> Result<String, CryptoError> {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.key));
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| CryptoError::Seal)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(hex::encode(sealed))
    }

    pub fn unseal(&self, sealed_hex: &str) -> Result<Vec<u8>, CryptoError> {
        let sealed = hex::decode(sealed_hex).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        if sealed.len() <= NONCE_LEN {
            return Err(CryptoError::TruncatedPayload);
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.key));
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::Unseal)
    }

    pub fn seal_private_key(&self, key: &PrivateKey) -> Result<String, CryptoError> {
        self.seal(key.as_bytes())
    }

    pub fn unseal_private_key(&self, sealed_hex: &str) -> Result<PrivateKey, CryptoError> {
        let mut plain = self.unseal(sealed_hex)?;
        let result = <[u8; 32]>::try_from(plain.as_slice())
            .map(PrivateKey)
            .map_err(|_| CryptoError::InvalidKeyLength {
                expected: 32,
                actual: plain.len(),
            });
        plain.zeroize();
        result
    }
}

//! Ed25519 key generation and key types.

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::CryptoError;

/// A 32-byte Ed25519 public key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// A 32-byte Ed25519 private key seed.
///
/// Not `Debug` or `Clone`; bytes are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(pub [u8; 32]);

impl PrivateKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

/// Generate a new Ed25519 key pair from the OS random source.
pub fn generate_keypair() -> KeyPair {
    let signing_key = SigningKey::generate(&mut OsRng);
    KeyPair {
        public: PublicKey(signing_key.verifying_key().to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}

pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    PublicKey(SigningKey::from_bytes(&private.0).verifying_key().to_bytes())
}

/// Derive a key pair from a 32-byte seed (deterministic).
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    let private = PrivateKey(*seed);
    KeyPair {
        public: public_from_private(&private),
        private,
    }
}

/// Parse a hex-encoded 32-byte seed, as found in operator configuration.
pub fn keypair_from_hex(seed_hex: &str) -> Result<KeyPair, CryptoError> {
    let mut bytes = hex::decode(seed_hex.trim()).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
    let result = <[u8; 32]>::try_from(bytes.as_slice())
        .map(|seed| keypair_from_seed(&seed))
        .map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: bytes.len(),
        });
    bytes.zeroize();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_valid_keypair() {
        let kp = generate_keypair();
        assert_ne!(kp.public.0, [0u8; 32]);
        assert_eq!(public_from_private(&kp.private), kp.public);
    }

    #[test]
    fn keypair_from_seed_deterministic() {
        let kp1 = keypair_from_seed(&[42u8; 32]);
        let kp2 = keypair_from_seed(&[42u8; 32]);
        assert_eq!(kp1.public, kp2.public);
        assert_ne!(kp1.public, keypair_from_seed(&[2u8; 32]).public);
    }

    #[test]
    fn hex_seed_parsing() {
        let kp = keypair_from_hex(&"07".repeat(32)).unwrap();
        assert_eq!(kp.public, keypair_from_seed(&[7u8; 32]).public);
        assert_eq!(kp.public.to_hex().len(), 64);

        assert!(matches!(keypair_from_hex("zz"), Err(CryptoError::InvalidHex(_))));
        assert_eq!(
            keypair_from_hex("0011").err(),
            Some(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: 2
            })
        );
    }
}

//! Cryptographic primitives for the Shamba registry.
//!
//! - **Ed25519** keys for farmer ledger accounts and operator request signing
//! - **SHA-256** digests for document and request-body fingerprints
//! - **ChaCha20-Poly1305** for sealing farmer private keys at rest

pub mod error;
pub mod hash;
pub mod keys;
pub mod sign;
pub mod vault;

pub use error::CryptoError;
pub use hash::{sha256, sha256_hex};
pub use keys::{
    generate_keypair, keypair_from_hex, keypair_from_seed, public_from_private, KeyPair,
    PrivateKey, PublicKey,
};
pub use sign::{sign_message, verify_signature, Signature};
pub use vault::KeyVault;

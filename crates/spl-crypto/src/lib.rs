//! # spl-crypto: Cryptographic Primitives
//!
//! - **Ed25519** key generation, signing and verification. Signing input is
//!   always `&CanonicalBytes`; raw byte slices cannot be signed.
//! - **SHA-256** digests of canonical payloads, used in verification reports.
//!
//! Keys and signatures travel as standard base64 strings.
//!
//! ## Crate Policy
//!
//! - Depends only on `spl-core` internally.
//! - No mocking of cryptographic operations in tests.

pub mod ed25519;
pub mod error;
pub mod sha256;

pub use ed25519::{
    verify, verify_with_public_key, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature,
    PUBLIC_KEY_LEN, SIGNATURE_LEN,
};
pub use error::CryptoError;
pub use sha256::sha256_hex;

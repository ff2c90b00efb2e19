//! # spl-bundle: Signed Credential Bundles
//!
//! A [`Bundle`] couples a [`DocumentRecord`](spl_core::DocumentRecord) with a
//! detached Ed25519 signature over its canonical encoding and the public key
//! that verifies it. Bundles are self-verifying: no trust store is consulted,
//! so a passing check proves internal consistency only.
//!
//! Wire form: base64 of the JSON object `{payload, signature, publicKey}`.

pub mod bundle;
pub mod error;
pub mod verify;

pub use bundle::Bundle;
pub use error::BundleError;
pub use verify::{inspect, verify, verify_encoded, VerificationReport};

//! # Bundle Builder & Signer
//!
//! [`Bundle::build()`] draws a fresh key pair for every call, signs the
//! canonical encoding of the complete record (MRZ included) and packages
//! the result. [`Bundle::build_with_key()`] takes an injected key instead,
//! for callers that manage issuer keys themselves.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use spl_core::{CanonicalBytes, DocumentRecord};
use spl_crypto::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

use crate::error::BundleError;

/// The signed unit `{payload, signature, publicKey}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Bundle {
    pub payload: DocumentRecord,
    pub signature: Ed25519Signature,
    pub public_key: Ed25519PublicKey,
}

impl Bundle {
    /// Sign `record` with a freshly generated, single-use key pair.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Encoding`] if the payload cannot be
    /// canonicalized.
    pub fn build(record: DocumentRecord) -> Result<Self, BundleError> {
        let key = Ed25519KeyPair::generate();
        Self::build_with_key(record, &key)
    }

    /// Sign `record` with the given key pair.
    pub fn build_with_key(record: DocumentRecord, key: &Ed25519KeyPair) -> Result<Self, BundleError> {
        let message = CanonicalBytes::new(&record)?;
        let signature = key.sign(&message);
        tracing::debug!(
            document_number = %record.document_number(),
            message_bytes = message.len(),
            "signed bundle payload"
        );
        Ok(Self {
            payload: record,
            signature,
            public_key: key.public_key(),
        })
    }

    /// The exact bytes that were signed.
    pub fn signed_message(&self) -> Result<CanonicalBytes, BundleError> {
        Ok(CanonicalBytes::new(&self.payload)?)
    }

    /// Compact JSON of the bundle.
    pub fn to_json(&self) -> Result<String, BundleError> {
        serde_json::to_string(self).map_err(|e| BundleError::Serialization(e.to_string()))
    }

    /// Parse bundle JSON. Missing or unknown fields and wrong-length key or
    /// signature material are all reported as [`BundleError::Malformed`].
    pub fn from_json(json: &str) -> Result<Self, BundleError> {
        serde_json::from_str(json).map_err(|e| BundleError::Malformed(e.to_string()))
    }

    /// Standard base64 of the bundle JSON; this is the string placed in the QR
    /// symbol.
    pub fn to_base64(&self) -> Result<String, BundleError> {
        Ok(STANDARD.encode(self.to_json()?))
    }

    /// Inverse of [`Bundle::to_base64()`].
    pub fn from_base64(encoded: &str) -> Result<Self, BundleError> {
        let raw = STANDARD
            .decode(encoded.trim())
            .map_err(|e| BundleError::Malformed(format!("bundle is not base64: {e}")))?;
        let json = String::from_utf8(raw)
            .map_err(|e| BundleError::Malformed(format!("bundle is not UTF-8: {e}")))?;
        Self::from_json(&json)
    }
}

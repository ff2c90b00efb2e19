//! # Bundle Verifier
//!
//! Recomputes the canonical payload and checks the detached signature with
//! the key embedded in the bundle.
//!
//! A structurally valid bundle whose signature does not match is a `false`
//! outcome, not an error. Errors are reserved for bundles that cannot be
//! read at all ([`BundleError::Malformed`]) or payloads that cannot be
//! canonicalized ([`BundleError::Encoding`]).

use serde::Serialize;
use spl_crypto::{sha256_hex, verify_with_public_key, CryptoError};

use crate::bundle::Bundle;
use crate::error::BundleError;

/// Check a decoded bundle.
///
/// An embedded key that is 32 bytes long but not a valid curve point cannot
/// verify anything and yields `false`.
pub fn verify(bundle: &Bundle) -> Result<bool, BundleError> {
    let message = bundle.signed_message()?;
    match verify_with_public_key(&message, &bundle.signature, &bundle.public_key) {
        Ok(()) => Ok(true),
        Err(CryptoError::VerificationFailed(reason)) | Err(CryptoError::KeyError(reason)) => {
            tracing::debug!(%reason, "bundle signature rejected");
            Ok(false)
        }
        Err(e) => Err(BundleError::Malformed(e.to_string())),
    }
}

/// Decode a base64 bundle string and check it.
pub fn verify_encoded(encoded: &str) -> Result<bool, BundleError> {
    verify(&Bundle::from_base64(encoded)?)
}

/// Details reported alongside the verification outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub signature_valid: bool,
    /// The stored MRZ matches the one derived from the payload fields.
    pub mrz_consistent: bool,
    /// SHA-256 (hex) of the canonical payload.
    pub payload_digest: String,
    pub key_fingerprint: String,
    pub document_number: String,
}

impl VerificationReport {
    /// Signature valid and MRZ consistent.
    pub fn is_ok(&self) -> bool {
        self.signature_valid && self.mrz_consistent
    }
}

/// Verify and collect a [`VerificationReport`].
pub fn inspect(bundle: &Bundle) -> Result<VerificationReport, BundleError> {
    let message = bundle.signed_message()?;
    Ok(VerificationReport {
        signature_valid: verify(bundle)?,
        mrz_consistent: bundle.payload.mrz_is_consistent(),
        payload_digest: sha256_hex(&message),
        key_fingerprint: bundle.public_key.fingerprint(),
        document_number: bundle.payload.document_number().to_string(),
    })
}

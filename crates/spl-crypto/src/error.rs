//! Errors raised by key handling and signature checks.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// The bytes are not a usable public key (not a curve point).
    #[error("key error: {0}")]
    KeyError(String),

    /// Key or signature material has the wrong length.
    #[error("{what} must be {expected} bytes, got {actual}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Key or signature text is not valid base64.
    #[error("invalid base64 in {what}: {reason}")]
    InvalidEncoding { what: &'static str, reason: String },
}

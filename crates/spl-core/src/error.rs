//! # Error Types
//!
//! Errors shared by every crate in the workspace. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Top-level error type for the core crate.
#[derive(Error, Debug)]
pub enum SplError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A field value failed validation (document number, sex code, timestamp).
    #[error("validation error: {0}")]
    Validation(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// The same sequence or map was reached twice during one encoding pass.
    #[error("circular reference: composite value encountered twice during encoding")]
    CircularReference,

    /// NaN and infinities have no canonical textual form.
    #[error("non-finite number cannot be canonicalized: {0}")]
    NonFiniteNumber(f64),

    /// Conversion of a `Serialize` value into the intermediate tree failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = SplError::Validation("sex must be one of M, F, X".into());
        assert_eq!(err.to_string(), "validation error: sex must be one of M, F, X");
    }

    #[test]
    fn test_canonicalization_converts_into_top_level() {
        let err: SplError = CanonicalizationError::CircularReference.into();
        assert!(matches!(
            err,
            SplError::Canonicalization(CanonicalizationError::CircularReference)
        ));
        assert!(err.to_string().starts_with("canonicalization error: circular reference"));
    }
}

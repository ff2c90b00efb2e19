//! Bundle error taxonomy.

use spl_core::CanonicalizationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleError {
    /// The payload could not be canonicalized (cyclic structure).
    #[error("encoding error: {0}")]
    Encoding(#[from] CanonicalizationError),

    /// The bundle text is not base64 JSON of the expected shape, a field is
    /// missing, or key/signature material has the wrong length.
    #[error("malformed bundle: {0}")]
    Malformed(String),

    /// Serializing a bundle to JSON failed.
    #[error("bundle serialization failed: {0}")]
    Serialization(String),
}

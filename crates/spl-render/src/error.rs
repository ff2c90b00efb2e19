//! Render-side error taxonomy.

use thiserror::Error;

/// Failures of the raster collaborators (photo decoder, QR encoder).
#[derive(Error, Debug)]
pub enum RasterError {
    /// The photo is not a well-formed base64 data URL.
    #[error("invalid data URL encoding: {0}")]
    InvalidEncoding(String),

    /// The data URL declares a media type other than PNG or JPEG.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The bytes could not be decoded as the declared format.
    #[error("image decode failed: {0}")]
    Decode(String),

    /// The payload does not fit in a QR symbol at the requested level.
    #[error("QR encoding failed: {0}")]
    Qr(String),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Raster(#[from] RasterError),

    /// A page recorded more drawing primitives than its budget allows.
    #[error("page {page:?} exceeded its primitive budget: {count} > {budget}")]
    PrimitiveBudgetExceeded {
        page: String,
        count: usize,
        budget: usize,
    },
}

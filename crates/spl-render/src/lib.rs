//! # spl-render: Credential Rendering
//!
//! Everything between a signed [`DocumentRecord`](spl_core::DocumentRecord)
//! and PDF bytes:
//!
//! - [`pattern`]: pure generators for rosettes, waves, watermark tiles,
//!   microtext, perforation and gradient bands.
//! - [`surface`]: the [`DrawingSurface`] primitives composition draws with.
//! - [`canvas`]: a recording surface producing immutable [`Page`]s.
//! - [`compose`]: the booklet layout (cover, data page, filler pages).
//! - [`raster`]: photo decoding and QR encoding behind traits.
//! - [`pdf`]: the PDF writer.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner.

pub mod canvas;
pub mod compose;
pub mod error;
pub mod geometry;
pub mod metrics;
pub mod pattern;
pub mod pdf;
pub mod raster;
pub mod style;
pub mod surface;

pub use canvas::{Command, Page, PageCanvas, RenderedDocument, DEFAULT_PRIMITIVE_BUDGET};
pub use compose::{PageComposer, DATA_FIELD_LABELS, DEFAULT_FILLER_PAGES};
pub use error::{RasterError, RenderError};
pub use geometry::{Color, Point, Rect, Size};
pub use metrics::StandardMetrics;
pub use pattern::Polyline;
pub use pdf::write_pdf;
pub use raster::{
    parse_data_url, EcLevel, ImagePhotoDecoder, PhotoDecoder, PhotoFormat, PixelData,
    QrCodeEncoder, QrEncoder, Raster,
};
pub use style::{Density, Style, StyleConfig};
pub use surface::{DrawingSurface, Font, FontMetrics, ImageSlot, TextStyle};

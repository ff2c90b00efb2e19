//! # Raster Collaborators
//!
//! The two externally supplied images on the data page:
//!
//! - **Photo**: arrives as a `data:image/png;base64,...` or
//!   `data:image/jpeg;base64,...` URL. JPEG data within the size limit is kept
//!   as-is and embedded with `DCTDecode`; PNG is decoded to 8-bit RGB with any
//!   alpha composited over white. Photos larger than the limit are
//!   downscaled.
//! - **QR**: the base64 bundle string rendered as a grayscale module raster.
//!
//! Both sit behind traits ([`PhotoDecoder`], [`QrEncoder`]) so callers can
//! substitute their own implementations.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, GenericImageView, ImageFormat};
use serde::{Deserialize, Serialize};

use crate::error::RasterError;

/// Largest photo edge, in pixels, kept without downscaling.
pub const DEFAULT_MAX_PHOTO_EDGE: u32 = 600;

/// Pixel payload of a [`Raster`].
#[derive(Clone, PartialEq, Eq)]
pub enum PixelData {
    /// A complete JPEG stream, passed through untouched.
    Dct { data: Vec<u8>, gray: bool },
    /// Row-major 8-bit RGB.
    Rgb(Vec<u8>),
    /// Row-major 8-bit luminance.
    Gray(Vec<u8>),
}

impl std::fmt::Debug for PixelData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelData::Dct { data, gray } => write!(f, "Dct({} bytes, gray={gray})", data.len()),
            PixelData::Rgb(data) => write!(f, "Rgb({} bytes)", data.len()),
            PixelData::Gray(data) => write!(f, "Gray({} bytes)", data.len()),
        }
    }
}

/// A decoded image ready for embedding.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: PixelData,
}

impl Raster {
    /// Wrap raw pixels, checking the buffer length against the dimensions.
    pub fn new(width: u32, height: u32, pixels: PixelData) -> Result<Self, RasterError> {
        let expected = width as usize * height as usize;
        let ok = match &pixels {
            PixelData::Dct { data, .. } => !data.is_empty(),
            PixelData::Rgb(data) => data.len() == expected * 3,
            PixelData::Gray(data) => data.len() == expected,
        };
        if !ok || width == 0 || height == 0 {
            return Err(RasterError::Decode(format!(
                "pixel buffer does not match {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &PixelData {
        &self.pixels
    }
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.pixels {
            PixelData::Dct { .. } => "dct",
            PixelData::Rgb(_) => "rgb",
            PixelData::Gray(_) => "gray",
        };
        write!(f, "Raster({}x{} {kind})", self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// Data URLs and photo decoding
// ---------------------------------------------------------------------------

/// Media types accepted for the photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoFormat {
    Png,
    Jpeg,
}

impl PhotoFormat {
    fn from_mime(mime: &str) -> Result<Self, RasterError> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Ok(PhotoFormat::Png),
            "image/jpeg" | "image/jpg" => Ok(PhotoFormat::Jpeg),
            other => Err(RasterError::UnsupportedFormat(other.to_string())),
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            PhotoFormat::Png => ImageFormat::Png,
            PhotoFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Split `data:<mime>;base64,<payload>` into its media type and decoded
/// bytes.
///
/// # Errors
///
/// [`RasterError::InvalidEncoding`] when the prefix, the `;base64,` marker
/// or the base64 payload is missing or invalid.
pub fn parse_data_url(url: &str) -> Result<(String, Vec<u8>), RasterError> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| RasterError::InvalidEncoding("missing data: prefix".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| RasterError::InvalidEncoding("missing ',' separator".to_string()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| RasterError::InvalidEncoding("payload is not base64-encoded".to_string()))?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| RasterError::InvalidEncoding(format!("bad base64 payload: {e}")))?;
    if bytes.is_empty() {
        return Err(RasterError::InvalidEncoding("empty payload".to_string()));
    }
    Ok((mime.to_string(), bytes))
}

/// Turns the submitted photo into a raster.
pub trait PhotoDecoder: Send + Sync {
    fn decode(&self, data_url: &str) -> Result<Raster, RasterError>;
}

/// [`PhotoDecoder`] backed by the `image` crate.
#[derive(Debug, Clone, Copy)]
pub struct ImagePhotoDecoder {
    pub max_edge: u32,
}

impl Default for ImagePhotoDecoder {
    fn default() -> Self {
        Self {
            max_edge: DEFAULT_MAX_PHOTO_EDGE,
        }
    }
}

impl PhotoDecoder for ImagePhotoDecoder {
    fn decode(&self, data_url: &str) -> Result<Raster, RasterError> {
        let (mime, bytes) = parse_data_url(data_url)?;
        let format = PhotoFormat::from_mime(&mime)?;
        let decoded = image::load_from_memory_with_format(&bytes, format.image_format())
            .map_err(|e| RasterError::Decode(e.to_string()))?;
        let (width, height) = decoded.dimensions();
        let max_edge = self.max_edge.max(1);

        if width > max_edge || height > max_edge {
            tracing::warn!(width, height, max_edge, "downscaling oversize photo");
            let scaled = decoded.resize(max_edge, max_edge, image::imageops::FilterType::Triangle);
            return rgb_raster(&scaled);
        }

        if format == PhotoFormat::Jpeg {
            let gray = match decoded.color() {
                image::ColorType::L8 => Some(true),
                image::ColorType::Rgb8 => Some(false),
                _ => None,
            };
            if let Some(gray) = gray {
                return Raster::new(width, height, PixelData::Dct { data: bytes, gray });
            }
        }
        rgb_raster(&decoded)
    }
}

/// Flatten to RGB, compositing alpha over white.
fn rgb_raster(image: &DynamicImage) -> Result<Raster, RasterError> {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u16::from(a);
        for channel in [r, g, b] {
            let blended = (u16::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255;
            rgb.push(blended as u8);
        }
    }
    Raster::new(width, height, PixelData::Rgb(rgb))
}

// ---------------------------------------------------------------------------
// QR
// ---------------------------------------------------------------------------

/// Error-correction preference for the QR symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EcLevel {
    Low,
    #[default]
    Medium,
    Quartile,
    High,
}

impl From<EcLevel> for qrcode::EcLevel {
    fn from(level: EcLevel) -> Self {
        match level {
            EcLevel::Low => qrcode::EcLevel::L,
            EcLevel::Medium => qrcode::EcLevel::M,
            EcLevel::Quartile => qrcode::EcLevel::Q,
            EcLevel::High => qrcode::EcLevel::H,
        }
    }
}

/// Encodes bytes into a scannable raster.
pub trait QrEncoder: Send + Sync {
    fn encode(&self, data: &[u8], level: EcLevel) -> Result<Raster, RasterError>;
}

/// [`QrEncoder`] backed by the `qrcode` crate.
#[derive(Debug, Clone, Copy)]
pub struct QrCodeEncoder {
    /// Pixels per module edge.
    pub module_px: u32,
    pub quiet_zone: bool,
}

impl Default for QrCodeEncoder {
    fn default() -> Self {
        Self {
            module_px: 2,
            quiet_zone: true,
        }
    }
}

impl QrEncoder for QrCodeEncoder {
    fn encode(&self, data: &[u8], level: EcLevel) -> Result<Raster, RasterError> {
        let code = qrcode::QrCode::with_error_correction_level(data, level.into())
            .map_err(|e| RasterError::Qr(e.to_string()))?;
        let module = self.module_px.max(1);
        let img = code
            .render::<image::Luma<u8>>()
            .quiet_zone(self.quiet_zone)
            .module_dimensions(module, module)
            .build();
        let (width, height) = img.dimensions();
        tracing::debug!(width, height, payload_bytes = data.len(), "rendered QR raster");
        Raster::new(width, height, PixelData::Gray(img.into_raw()))
    }
}

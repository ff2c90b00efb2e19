//! # Drawing Surface
//!
//! The narrow set of primitives page composition needs from a backend.
//! [`PageCanvas`](crate::canvas::PageCanvas) records them for the built-in
//! PDF writer; another backend only has to implement these two traits.

use crate::geometry::{Color, Point, Rect};
use crate::pattern::Polyline;

/// The three base-14 faces used on every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    /// Helvetica.
    Regular,
    /// Helvetica-Bold.
    Bold,
    /// Courier, for the MRZ.
    Mono,
}

impl Font {
    pub fn base_name(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Mono => "Courier",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f64,
    pub color: Color,
    /// Counter-clockwise rotation about the text origin.
    pub rotation_deg: f64,
    pub opacity: f64,
}

impl TextStyle {
    pub fn new(font: Font, size: f64) -> Self {
        Self {
            font,
            size,
            color: Color::BLACK,
            rotation_deg: 0.0,
            opacity: 1.0,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation_deg = degrees;
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }
}

/// Which externally supplied raster an image primitive refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    Photo,
    Qr,
}

/// Advance widths for laying out text.
pub trait FontMetrics {
    /// Width of `text` in points when set in `font` at `size`.
    fn text_width(&self, font: Font, size: f64, text: &str) -> f64;
}

pub trait DrawingSurface {
    fn fill_rect(&mut self, rect: Rect, color: Color, opacity: f64);

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64, opacity: f64);

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color, opacity: f64);

    fn draw_image(&mut self, rect: Rect, slot: ImageSlot);

    fn draw_text(&mut self, origin: Point, text: &str, style: &TextStyle);

    fn stroke_path(&mut self, path: &Polyline, color: Color, line_width: f64, opacity: f64);

    /// Non-rendered annotation (section and field markers). Backends that
    /// have no use for it ignore it.
    fn mark(&mut self, _key: &str, _value: &str) {}

    fn metrics(&self) -> &dyn FontMetrics;
}

//! # Recorded Pages
//!
//! [`PageCanvas`] implements [`DrawingSurface`] by appending [`Command`]s in
//! call order. [`PageCanvas::finish()`] seals the recording into an
//! immutable [`Page`]; there is no way to add primitives to a finished page.
//!
//! Draw order is significant (later primitives paint over earlier ones) and
//! is preserved exactly, which is what makes "watermark last" checkable.

use crate::error::RenderError;
use crate::geometry::{Color, Point, Rect, Size};
use crate::metrics::StandardMetrics;
use crate::pattern::Polyline;
use crate::raster::Raster;
use crate::surface::{DrawingSurface, FontMetrics, ImageSlot, TextStyle};

/// Default cap on rendered primitives per page.
pub const DEFAULT_PRIMITIVE_BUDGET: usize = 4096;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Non-rendered marker used for section/field bookkeeping. Ignored by the PDF writer.
    Meta {
        key: String,
        value: String,
    },
    FillRect {
        rect: Rect,
        color: Color,
        opacity: f64,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        line_width: f64,
        opacity: f64,
    },
    FillCircle {
        center: Point,
        radius: f64,
        color: Color,
        opacity: f64,
    },
    Image {
        rect: Rect,
        slot: ImageSlot,
    },
    Text {
        origin: Point,
        text: String,
        style: TextStyle,
    },
    StrokePath {
        path: Polyline,
        color: Color,
        line_width: f64,
        opacity: f64,
    },
}

impl Command {
    /// Markers do not count against the primitive budget.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Command::Meta { .. })
    }

    /// Opacity this command paints with, if any.
    pub fn opacity(&self) -> Option<f64> {
        match self {
            Command::FillRect { opacity, .. }
            | Command::StrokeRect { opacity, .. }
            | Command::FillCircle { opacity, .. }
            | Command::StrokePath { opacity, .. } => Some(*opacity),
            Command::Text { style, .. } => Some(style.opacity),
            Command::Meta { .. } | Command::Image { .. } => None,
        }
    }
}

/// Records drawing calls for one page.
#[derive(Debug)]
pub struct PageCanvas {
    label: String,
    size: Size,
    commands: Vec<Command>,
    budget: usize,
    metrics: StandardMetrics,
}

impl PageCanvas {
    pub fn new(label: impl Into<String>, size: Size) -> Self {
        Self::with_budget(label, size, DEFAULT_PRIMITIVE_BUDGET)
    }

    pub fn with_budget(label: impl Into<String>, size: Size, budget: usize) -> Self {
        Self {
            label: label.into(),
            size,
            commands: Vec::new(),
            budget,
            metrics: StandardMetrics,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Seal the recording.
    ///
    /// # Errors
    ///
    /// [`RenderError::PrimitiveBudgetExceeded`] when more primitives were
    /// recorded than the budget allows.
    pub fn finish(self) -> Result<Page, RenderError> {
        let count = self.commands.iter().filter(|c| c.is_primitive()).count();
        if count > self.budget {
            return Err(RenderError::PrimitiveBudgetExceeded {
                page: self.label,
                count,
                budget: self.budget,
            });
        }
        Ok(Page {
            label: self.label,
            size: self.size,
            commands: self.commands,
        })
    }
}

impl DrawingSurface for PageCanvas {
    fn fill_rect(&mut self, rect: Rect, color: Color, opacity: f64) {
        self.commands.push(Command::FillRect {
            rect,
            color,
            opacity,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64, opacity: f64) {
        self.commands.push(Command::StrokeRect {
            rect,
            color,
            line_width,
            opacity,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color, opacity: f64) {
        self.commands.push(Command::FillCircle {
            center,
            radius,
            color,
            opacity,
        });
    }

    fn draw_image(&mut self, rect: Rect, slot: ImageSlot) {
        self.commands.push(Command::Image { rect, slot });
    }

    fn draw_text(&mut self, origin: Point, text: &str, style: &TextStyle) {
        self.commands.push(Command::Text {
            origin,
            text: text.to_string(),
            style: *style,
        });
    }

    fn stroke_path(&mut self, path: &Polyline, color: Color, line_width: f64, opacity: f64) {
        if path.points.len() < 2 {
            return;
        }
        self.commands.push(Command::StrokePath {
            path: path.clone(),
            color,
            line_width,
            opacity,
        });
    }

    fn mark(&mut self, key: &str, value: &str) {
        self.commands.push(Command::Meta {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    fn metrics(&self) -> &dyn FontMetrics {
        &self.metrics
    }
}

/// A finished, immutable page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    label: String,
    size: Size,
    commands: Vec<Command>,
}

impl Page {
    /// Short name of the page ("cover", "data", "page-3", ...).
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn primitive_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_primitive()).count()
    }

    /// Values of every marker with the given key, in draw order.
    pub fn marks<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.commands.iter().filter_map(move |c| match c {
            Command::Meta { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Primitives recorded after the marker `key = value`, up to the next
    /// marker with the same key.
    pub fn section(&self, key: &str, value: &str) -> &[Command] {
        let start = self.commands.iter().position(|c| {
            matches!(c, Command::Meta { key: k, value: v } if k == key && v == value)
        });
        let Some(start) = start else {
            return &[];
        };
        let rest = &self.commands[start + 1..];
        let end = rest
            .iter()
            .position(|c| matches!(c, Command::Meta { key: k, .. } if k == key))
            .unwrap_or(rest.len());
        &rest[..end]
    }
}

/// The ordered pages of one issuance plus the rasters they reference.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pages: Vec<Page>,
    photo: Raster,
    qr: Raster,
}

impl RenderedDocument {
    pub fn new(pages: Vec<Page>, photo: Raster, qr: Raster) -> Self {
        Self { pages, photo, qr }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn raster(&self, slot: ImageSlot) -> &Raster {
        match slot {
            ImageSlot::Photo => &self.photo,
            ImageSlot::Qr => &self.qr,
        }
    }
}

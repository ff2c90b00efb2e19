//! # Security Pattern Generators
//!
//! Pure functions from parameters to geometry. Nothing here touches a
//! surface: the composer decides colors, widths and draw order.
//!
//! Every generator sanitizes its inputs so that finite output is guaranteed
//! for any input: non-finite parameters fall back to neutral values, sample
//! and step counts are clamped, and divisors are kept away from zero.

use std::f64::consts::TAU;

use crate::geometry::{Color, Point, Rect, Size};
use crate::surface::{Font, FontMetrics, TextStyle};

/// Bounds applied to curve sample counts.
pub const MIN_SAMPLES: usize = 16;
pub const MAX_SAMPLES: usize = 2048;

/// Bounds applied to gradient step counts.
pub const MIN_GRADIENT_STEPS: usize = 8;
pub const MAX_GRADIENT_STEPS: usize = 120;

/// Smallest magnitude allowed for the rolling-circle radius.
const MIN_ROLLING_RADIUS: f64 = 1e-3;

/// Smallest step for dot and tick runs.
const MIN_RUN_STEP: f64 = 0.5;

/// An open or closed run of points, stroked as move-to followed by line-tos.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
}

/// A text string placed at a point with a style.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStamp {
    pub origin: Point,
    pub text: String,
    pub style: TextStyle,
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Clamp a requested sample count into [`MIN_SAMPLES`]..=[`MAX_SAMPLES`].
pub fn clamp_samples(samples: usize) -> usize {
    samples.clamp(MIN_SAMPLES, MAX_SAMPLES)
}

// ---------------------------------------------------------------------------
// Rosette
// ---------------------------------------------------------------------------

/// Hypotrochoid parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RosetteParams {
    pub center: Point,
    /// Radius of the fixed circle.
    pub fixed_radius: f64,
    /// Radius of the rolling circle.
    pub rolling_radius: f64,
    /// Distance of the pen from the rolling circle's center.
    pub pen_offset: f64,
    pub revolutions: f64,
    pub samples: usize,
    pub closed: bool,
}

/// Trace a hypotrochoid:
///
/// ```text
/// x(t) = (R - r) cos t + d cos(((R - r) / r) t)
/// y(t) = (R - r) sin t - d sin(((R - r) / r) t)
/// ```
///
/// for `t` in `0..=revolutions * 2π`, producing `samples + 1` points after
/// clamping `samples`.
pub fn rosette(params: &RosetteParams) -> Polyline {
    let samples = clamp_samples(params.samples);
    let cx = finite_or(params.center.x, 0.0);
    let cy = finite_or(params.center.y, 0.0);
    let big_r = finite_or(params.fixed_radius, 0.0);
    let mut small_r = finite_or(params.rolling_radius, MIN_ROLLING_RADIUS);
    if small_r.abs() < MIN_ROLLING_RADIUS {
        small_r = MIN_ROLLING_RADIUS.copysign(small_r);
    }
    let d = finite_or(params.pen_offset, 0.0);
    let span = finite_or(params.revolutions, 1.0) * TAU;

    let diff = big_r - small_r;
    let ratio = diff / small_r;
    let points = (0..=samples)
        .map(|i| {
            let t = span * i as f64 / samples as f64;
            let x = diff * t.cos() + d * (ratio * t).cos();
            let y = diff * t.sin() - d * (ratio * t).sin();
            Point::new(cx + x, cy + y)
        })
        .collect();

    Polyline {
        points,
        closed: params.closed,
    }
}

// ---------------------------------------------------------------------------
// Wave
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveParams {
    pub x_start: f64,
    pub x_end: f64,
    pub baseline: f64,
    pub amplitude: f64,
    /// Full cycles between `x_start` and `x_end`.
    pub frequency: f64,
    pub phase: f64,
    pub samples: usize,
}

/// A horizontal sinusoid from `x_start` to `x_end` with `samples + 1` points.
pub fn wave(params: &WaveParams) -> Polyline {
    let samples = clamp_samples(params.samples);
    let x0 = finite_or(params.x_start, 0.0);
    let x1 = finite_or(params.x_end, x0);
    let baseline = finite_or(params.baseline, 0.0);
    let amplitude = finite_or(params.amplitude, 0.0);
    let frequency = finite_or(params.frequency, 0.0);
    let phase = finite_or(params.phase, 0.0);

    let points = (0..=samples)
        .map(|i| {
            let u = i as f64 / samples as f64;
            let x = x0 + (x1 - x0) * u;
            let y = baseline + amplitude * (TAU * frequency * u + phase).sin();
            Point::new(x, y)
        })
        .collect();

    Polyline {
        points,
        closed: false,
    }
}

// ---------------------------------------------------------------------------
// Tiled watermark
// ---------------------------------------------------------------------------

/// Grid and appearance of the page-covering watermark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatermarkGrid {
    /// First tile origin; negative so partial tiles cover the lower-left edge.
    pub origin: Point,
    pub stride_x: f64,
    pub stride_y: f64,
    /// How far past the right and top edges tiles keep being placed.
    pub overscan: f64,
    pub size: f64,
    pub rotation_deg: f64,
    pub opacity: f64,
    pub color: Color,
    pub font: Font,
}

impl Default for WatermarkGrid {
    fn default() -> Self {
        Self {
            origin: Point::new(-120.0, -80.0),
            stride_x: 220.0,
            stride_y: 140.0,
            overscan: 120.0,
            size: 16.0,
            rotation_deg: 25.0,
            opacity: 0.14,
            color: Color::gray(0.65),
            font: Font::Bold,
        }
    }
}

/// Stamp `text` over the whole page, including partial tiles at every edge.
/// Rows run bottom to top, tiles left to right within a row.
pub fn watermark_tiles(page: Size, text: &str, grid: &WatermarkGrid) -> Vec<TextStamp> {
    let stride_x = finite_or(grid.stride_x, 1.0).max(1.0);
    let stride_y = finite_or(grid.stride_y, 1.0).max(1.0);
    let overscan = finite_or(grid.overscan, 0.0).max(0.0);
    let style = TextStyle::new(grid.font, grid.size)
        .color(grid.color)
        .rotated(grid.rotation_deg)
        .opacity(grid.opacity);

    let x_limit = page.width + overscan;
    let y_limit = page.height + overscan;
    let mut stamps = Vec::new();
    let mut y = finite_or(grid.origin.y, 0.0);
    while y < y_limit {
        let mut x = finite_or(grid.origin.x, 0.0);
        while x < x_limit {
            stamps.push(TextStamp {
                origin: Point::new(x, y),
                text: text.to_string(),
                style,
            });
            x += stride_x;
        }
        y += stride_y;
    }
    stamps
}

// ---------------------------------------------------------------------------
// Microtext
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MicrotextParams<'a> {
    /// Baseline origin of the first (top) line.
    pub origin: Point,
    pub width: f64,
    pub lines: usize,
    pub line_gap: f64,
    pub phrase: &'a str,
    pub size: f64,
    pub opacity: f64,
    pub color: Color,
}

/// `lines` rows of `phrase` repeated to fill `width`, stacked downwards.
///
/// Each row is rotated by one word relative to the previous so the columns
/// do not line up.
pub fn microtext_block(metrics: &dyn FontMetrics, params: &MicrotextParams<'_>) -> Vec<TextStamp> {
    let font = Font::Regular;
    let style = TextStyle::new(font, params.size)
        .color(params.color)
        .opacity(params.opacity);
    let words: Vec<&str> = params.phrase.split_whitespace().collect();
    if words.is_empty() || params.lines == 0 {
        return Vec::new();
    }

    (0..params.lines)
        .map(|row| {
            let mut text = String::new();
            let mut idx = row % words.len();
            loop {
                let candidate = if text.is_empty() {
                    words[idx].to_string()
                } else {
                    format!("{text} {}", words[idx])
                };
                if metrics.text_width(font, params.size, &candidate) > params.width
                    && !text.is_empty()
                {
                    break;
                }
                text = candidate;
                idx = (idx + 1) % words.len();
                if text.len() > 4096 {
                    break;
                }
            }
            TextStamp {
                origin: Point::new(
                    params.origin.x,
                    params.origin.y - params.line_gap * row as f64,
                ),
                text,
                style,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Perforation dots and spine ticks
// ---------------------------------------------------------------------------

/// Centers of a vertical run of dots from `y_start` up to (at most) `y_end`.
pub fn perforation_dots(x: f64, y_start: f64, y_end: f64, step: f64) -> Vec<Point> {
    vertical_run(x, y_start, y_end, step)
        .map(|y| Point::new(x, y))
        .collect()
}

/// Short horizontal ticks along a binding spine at `x`.
pub fn spine_ticks(x: f64, y_start: f64, y_end: f64, step: f64, length: f64) -> Vec<Polyline> {
    let length = finite_or(length, 0.0);
    vertical_run(x, y_start, y_end, step)
        .map(|y| Polyline {
            points: vec![Point::new(x, y), Point::new(x + length, y)],
            closed: false,
        })
        .collect()
}

fn vertical_run(x: f64, y_start: f64, y_end: f64, step: f64) -> impl Iterator<Item = f64> {
    let x_ok = x.is_finite();
    let y0 = finite_or(y_start, 0.0);
    let y1 = finite_or(y_end, y0);
    let step = finite_or(step, MIN_RUN_STEP).abs().max(MIN_RUN_STEP);
    let count = if x_ok && y1 >= y0 {
        ((y1 - y0) / step).floor() as usize + 1
    } else {
        0
    };
    (0..count).map(move |i| y0 + step * i as f64)
}

// ---------------------------------------------------------------------------
// Gradient band
// ---------------------------------------------------------------------------

/// Stack of thin horizontal strips filling `rect` bottom to top, colors
/// interpolated from `from` (bottom) to `to` (top).
pub fn gradient_band(rect: Rect, from: Color, to: Color, steps: usize) -> Vec<(Rect, Color)> {
    let steps = steps.clamp(MIN_GRADIENT_STEPS, MAX_GRADIENT_STEPS);
    let strip = rect.height / steps as f64;
    (0..steps)
        .map(|i| {
            let t = i as f64 / (steps - 1) as f64;
            (
                Rect::new(rect.x, rect.y + strip * i as f64, rect.width, strip),
                from.lerp(to, t),
            )
        })
        .collect()
}

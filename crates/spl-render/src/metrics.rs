//! Advance widths for the base-14 faces, in 1/1000 em.
//!
//! Only printable ASCII is ever drawn; anything else is replaced by `?`
//! before layout and before it reaches a content stream.

use crate::surface::{Font, FontMetrics};

const COURIER_WIDTH: u16 = 600;
const FALLBACK: char = '?';

const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584,
    278, 333, 278, 278, 556, 556, 556, 556, 556, 556, 556, 556,
    556, 556, 278, 278, 584, 584, 584, 556, 1015, 667, 667, 722,
    722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278,
    278, 278, 469, 556, 333, 556, 556, 500, 556, 556, 278, 556,
    556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584,
    278, 333, 278, 278, 556, 556, 556, 556, 556, 556, 556, 556,
    556, 556, 333, 333, 584, 584, 584, 611, 975, 722, 722, 722,
    722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333,
    278, 333, 584, 556, 333, 556, 611, 556, 611, 556, 333, 611,
    611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
    333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Replace every character outside printable ASCII with `?`.
pub fn printable_ascii(text: &str) -> String {
    text.chars()
        .map(|c| if (' '..='~').contains(&c) { c } else { FALLBACK })
        .collect()
}

fn glyph_width(font: Font, c: char) -> u16 {
    let c = if (' '..='~').contains(&c) { c } else { FALLBACK };
    let idx = c as usize - 32;
    match font {
        Font::Regular => HELVETICA_WIDTHS[idx],
        Font::Bold => HELVETICA_BOLD_WIDTHS[idx],
        Font::Mono => COURIER_WIDTH,
    }
}

/// AFM metrics of Helvetica, Helvetica-Bold and Courier.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMetrics;

impl FontMetrics for StandardMetrics {
    fn text_width(&self, font: Font, size: f64, text: &str) -> f64 {
        let units: u32 = text.chars().map(|c| u32::from(glyph_width(font, c))).sum();
        f64::from(units) * size / 1000.0
    }
}

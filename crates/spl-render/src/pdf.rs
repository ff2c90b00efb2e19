//! # PDF Writer
//!
//! Serializes a [`RenderedDocument`] into a self-contained PDF 1.4 file:
//! base-14 fonts only, the two rasters as image XObjects, one ExtGState per
//! distinct opacity, and a classic cross-reference table.
//!
//! Object layout is fixed so the output is byte-for-byte deterministic for a
//! given document:
//!
//! | id          | object                      |
//! |-------------|-----------------------------|
//! | 1           | catalog                     |
//! | 2           | page tree                   |
//! | 3, 4, 5     | fonts `F1`, `F2`, `F3`      |
//! | 6, 7        | images `Im1` (photo), `Im2` (QR) |
//! | 8 ..        | ExtGStates `GS1` ..         |
//! | then        | page + content stream pairs |
//! | last        | info dictionary             |
//!
//! Content streams are built in parallel; objects are written sequentially.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;

use rayon::prelude::*;

use crate::canvas::{Command, Page, RenderedDocument};
use crate::geometry::{Color, Point, Rect};
use crate::metrics::printable_ascii;
use crate::pattern::Polyline;
use crate::raster::{PixelData, Raster};
use crate::surface::{Font, ImageSlot};

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FIRST_FONT_ID: usize = 3;
const PHOTO_ID: usize = 6;
const QR_ID: usize = 7;
const FIRST_GS_ID: usize = 8;

const FONTS: [Font; 3] = [Font::Regular, Font::Bold, Font::Mono];

/// Control-point distance for a quarter circle drawn as one cubic Bézier.
const KAPPA: f64 = 0.552_284_75;

const PRODUCER: &str = "spl-render";

/// Serialize `doc` to PDF bytes.
pub fn write_pdf(doc: &RenderedDocument) -> Vec<u8> {
    let opacities = collect_opacities(doc.pages());
    let gs_names: HashMap<u16, String> = opacities
        .iter()
        .enumerate()
        .map(|(i, milli)| (*milli, format!("GS{}", i + 1)))
        .collect();

    let streams: Vec<String> = doc
        .pages()
        .par_iter()
        .map(|page| render_page(page, &gs_names))
        .collect();

    let first_page_id = FIRST_GS_ID + opacities.len();
    let page_id = |index: usize| first_page_id + 2 * index;
    let info_id = first_page_id + 2 * doc.pages().len();

    let mut w = ObjectWriter::new(info_id);

    w.write_object(
        CATALOG_ID,
        &format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>"),
    );
    let kids = (0..doc.pages().len())
        .map(|i| format!("{} 0 R", page_id(i)))
        .collect::<Vec<_>>()
        .join(" ");
    w.write_object(
        PAGES_ID,
        &format!(
            "<< /Type /Pages /Kids [{kids}] /Count {} >>",
            doc.pages().len()
        ),
    );

    for (i, font) in FONTS.iter().enumerate() {
        w.write_object(FIRST_FONT_ID + i, &font_object(*font));
    }
    w.write_object(PHOTO_ID, &image_object(doc.raster(ImageSlot::Photo)));
    w.write_object(QR_ID, &image_object(doc.raster(ImageSlot::Qr)));

    for (i, milli) in opacities.iter().enumerate() {
        let alpha = fmt(f64::from(*milli) / 1000.0);
        w.write_object(
            FIRST_GS_ID + i,
            &format!("<< /Type /ExtGState /ca {alpha} /CA {alpha} >>"),
        );
    }

    let resources = resources_dict(opacities.len());
    for (i, (page, stream)) in doc.pages().iter().zip(&streams).enumerate() {
        let id = page_id(i);
        let size = page.size();
        w.write_object(
            id,
            &format!(
                "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {} {}] /Resources {resources} /Contents {} 0 R >>",
                fmt(size.width),
                fmt(size.height),
                id + 1
            ),
        );
        w.write_object(
            id + 1,
            &format!(
                "<< /Length {} >>\nstream\n{stream}\nendstream",
                stream.len()
            ),
        );
    }

    w.write_object(
        info_id,
        &format!("<< /Producer ({PRODUCER}) /Title (Fictional credential sample) >>"),
    );

    let bytes = w.finish();
    tracing::debug!(
        pages = doc.pages().len(),
        ext_gstates = opacities.len(),
        bytes = bytes.len(),
        "wrote PDF"
    );
    bytes
}

// ---------------------------------------------------------------------------
// Object writer
// ---------------------------------------------------------------------------

struct ObjectWriter {
    out: Vec<u8>,
    offsets: Vec<usize>,
}

impl ObjectWriter {
    fn new(last_id: usize) -> Self {
        let mut out = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            out,
            offsets: vec![0; last_id + 1],
        }
    }

    fn write_object(&mut self, id: usize, body: &str) {
        if let Some(slot) = self.offsets.get_mut(id) {
            *slot = self.out.len();
        }
        self.out.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
        self.out.extend_from_slice(body.as_bytes());
        self.out.extend_from_slice(b"\nendobj\n");
    }

    fn finish(mut self) -> Vec<u8> {
        let total = self.offsets.len() - 1;
        let xref_start = self.out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", total + 1);
        for offset in &self.offsets[1..] {
            let _ = writeln!(xref, "{offset:010} 00000 n ");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root {CATALOG_ID} 0 R /Info {total} 0 R >>\nstartxref\n{xref_start}\n%%EOF",
            total + 1
        );
        self.out.extend_from_slice(xref.as_bytes());
        self.out
    }
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

fn font_key(font: Font) -> &'static str {
    match font {
        Font::Regular => "F1",
        Font::Bold => "F2",
        Font::Mono => "F3",
    }
}

fn font_object(font: Font) -> String {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        font.base_name()
    )
}

fn image_key(slot: ImageSlot) -> &'static str {
    match slot {
        ImageSlot::Photo => "Im1",
        ImageSlot::Qr => "Im2",
    }
}

fn image_object(raster: &Raster) -> String {
    let (data, color_space, filter) = match raster.pixels() {
        PixelData::Dct { data, gray } => (
            data.as_slice(),
            if *gray { "/DeviceGray" } else { "/DeviceRGB" },
            "[/ASCIIHexDecode /DCTDecode]",
        ),
        PixelData::Rgb(data) => (data.as_slice(), "/DeviceRGB", "/ASCIIHexDecode"),
        PixelData::Gray(data) => (data.as_slice(), "/DeviceGray", "/ASCIIHexDecode"),
    };
    let stream = encode_stream_data(data);
    format!(
        "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {color_space} /BitsPerComponent 8 /Length {} /Filter {filter} >>\nstream\n{stream}\nendstream",
        raster.width(),
        raster.height(),
        stream.len(),
    )
}

/// ASCII hex with a `>` end-of-data marker, wrapped at 128 columns.
fn encode_stream_data(data: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(data.len() * 2 + data.len() / 64 + 2);
    for (i, byte) in data.iter().enumerate() {
        if i > 0 && i % 64 == 0 {
            out.push('\n');
        }
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out.push('>');
    out
}

fn resources_dict(gs_count: usize) -> String {
    let fonts = FONTS
        .iter()
        .enumerate()
        .map(|(i, f)| format!("/{} {} 0 R", font_key(*f), FIRST_FONT_ID + i))
        .collect::<Vec<_>>()
        .join(" ");
    let mut dict = format!(
        "<< /Font << {fonts} >> /XObject << /Im1 {PHOTO_ID} 0 R /Im2 {QR_ID} 0 R >>"
    );
    if gs_count > 0 {
        let states = (0..gs_count)
            .map(|i| format!("/GS{} {} 0 R", i + 1, FIRST_GS_ID + i))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = write!(dict, " /ExtGState << {states} >>");
    }
    dict.push_str(" >>");
    dict
}

/// Distinct translucent opacities across all pages, quantized to 1/1000.
fn collect_opacities(pages: &[Page]) -> BTreeSet<u16> {
    pages
        .iter()
        .flat_map(|p| p.commands())
        .filter_map(Command::opacity)
        .map(quantize_opacity)
        .filter(|milli| *milli < 1000)
        .collect()
}

fn quantize_opacity(opacity: f64) -> u16 {
    if !opacity.is_finite() {
        return 1000;
    }
    ((opacity * 1000.0).round() as i32).clamp(0, 1000) as u16
}

// ---------------------------------------------------------------------------
// Content streams
// ---------------------------------------------------------------------------

fn render_page(page: &Page, gs_names: &HashMap<u16, String>) -> String {
    let mut out = String::new();
    for cmd in page.commands() {
        render_command(&mut out, cmd, gs_names);
    }
    out
}

fn render_command(out: &mut String, cmd: &Command, gs_names: &HashMap<u16, String>) {
    let gs = |opacity: f64| {
        gs_names
            .get(&quantize_opacity(opacity))
            .map(|name| format!("/{name} gs "))
            .unwrap_or_default()
    };
    let _ = match cmd {
        Command::Meta { .. } => Ok(()),
        Command::FillRect {
            rect,
            color,
            opacity,
        } => writeln!(
            out,
            "q {}{} {} re f Q",
            gs(*opacity),
            fill_color(*color),
            rect_ops(rect)
        ),
        Command::StrokeRect {
            rect,
            color,
            line_width,
            opacity,
        } => writeln!(
            out,
            "q {}{} {} w {} re S Q",
            gs(*opacity),
            stroke_color(*color),
            fmt(*line_width),
            rect_ops(rect)
        ),
        Command::FillCircle {
            center,
            radius,
            color,
            opacity,
        } => writeln!(
            out,
            "q {}{} {} f Q",
            gs(*opacity),
            fill_color(*color),
            circle_ops(*center, *radius)
        ),
        Command::Image { rect, slot } => writeln!(
            out,
            "q {} 0 0 {} {} {} cm /{} Do Q",
            fmt(rect.width),
            fmt(rect.height),
            fmt(rect.x),
            fmt(rect.y),
            image_key(*slot)
        ),
        Command::Text {
            origin,
            text,
            style,
        } => {
            let (sin, cos) = style.rotation_deg.to_radians().sin_cos();
            writeln!(
                out,
                "q {}{} BT /{} {} Tf {} {} {} {} {} {} Tm ({}) Tj ET Q",
                gs(style.opacity),
                fill_color(style.color),
                font_key(style.font),
                fmt(style.size),
                fmt(cos),
                fmt(sin),
                fmt(-sin),
                fmt(cos),
                fmt(origin.x),
                fmt(origin.y),
                escape_pdf_string(&printable_ascii(text))
            )
        }
        Command::StrokePath {
            path,
            color,
            line_width,
            opacity,
        } => writeln!(
            out,
            "q {}{} {} w 1 j {} S Q",
            gs(*opacity),
            stroke_color(*color),
            fmt(*line_width),
            path_ops(path)
        ),
    };
}

fn fill_color(c: Color) -> String {
    format!("{} {} {} rg", fmt(c.r), fmt(c.g), fmt(c.b))
}

fn stroke_color(c: Color) -> String {
    format!("{} {} {} RG", fmt(c.r), fmt(c.g), fmt(c.b))
}

fn rect_ops(r: &Rect) -> String {
    format!(
        "{} {} {} {}",
        fmt(r.x),
        fmt(r.y),
        fmt(r.width),
        fmt(r.height)
    )
}

fn circle_ops(c: Point, r: f64) -> String {
    let k = r * KAPPA;
    let (x, y) = (c.x, c.y);
    let mut ops = format!("{} {} m", fmt(x + r), fmt(y));
    let quarters = [
        (x + r, y + k, x + k, y + r, x, y + r),
        (x - k, y + r, x - r, y + k, x - r, y),
        (x - r, y - k, x - k, y - r, x, y - r),
        (x + k, y - r, x + r, y - k, x + r, y),
    ];
    for (x1, y1, x2, y2, x3, y3) in quarters {
        let _ = write!(
            ops,
            " {} {} {} {} {} {} c",
            fmt(x1),
            fmt(y1),
            fmt(x2),
            fmt(y2),
            fmt(x3),
            fmt(y3)
        );
    }
    ops.push_str(" h");
    ops
}

fn path_ops(path: &Polyline) -> String {
    let mut ops = String::new();
    for (i, p) in path.points.iter().enumerate() {
        let op = if i == 0 { "m" } else { "l" };
        if i > 0 {
            ops.push(' ');
        }
        let _ = write!(ops, "{} {} {op}", fmt(p.x), fmt(p.y));
    }
    if path.closed {
        ops.push_str(" h");
    }
    ops
}

fn escape_pdf_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

/// Three decimals, trailing zeros trimmed; non-finite values become `0`.
fn fmt(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    format_milli((value * 1000.0).round() as i64)
}

fn format_milli(milli: i64) -> String {
    if milli == 0 {
        return "0".to_string();
    }
    let sign = if milli < 0 { "-" } else { "" };
    let abs = milli.unsigned_abs();
    let int_part = abs / 1000;
    let frac_part = abs % 1000;
    if frac_part == 0 {
        return format!("{sign}{int_part}");
    }
    let mut s = format!("{sign}{int_part}.{frac_part:03}");
    while s.ends_with('0') {
        s.pop();
    }
    s
}

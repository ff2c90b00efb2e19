//! # Page Composer
//!
//! Lays out the booklet: cover, data page, then filler ("visa") pages, all
//! A4 unless configured otherwise.
//!
//! Contract with verifiers of the rendered output:
//!
//! - the data page carries exactly one photo, one QR, and the ten field rows
//!   of [`DATA_FIELD_LABELS`] in that order;
//! - every page draws its tiled watermark last;
//! - filler pages hold a 2 x 3 grid of stamp boxes and a `PAGE N` header,
//!   where `N` is the 1-based position of the page in the booklet.
//!
//! Section and field boundaries are recorded as non-rendered markers
//! (`section`, `field`, `stamp`) so the above can be checked on a [`Page`].

use rayon::prelude::*;
use spl_core::DocumentRecord;

use crate::canvas::{Page, PageCanvas, RenderedDocument, DEFAULT_PRIMITIVE_BUDGET};
use crate::error::RenderError;
use crate::geometry::{Color, Point, Rect, Size};
use crate::pattern::{
    gradient_band, microtext_block, perforation_dots, rosette, spine_ticks, wave,
    watermark_tiles, MicrotextParams, RosetteParams, TextStamp, WatermarkGrid, WaveParams,
};
use crate::raster::Raster;
use crate::style::{Style, StyleConfig};
use crate::surface::{DrawingSurface, Font, ImageSlot, TextStyle};

/// Row labels of the data page, in contract order.
pub const DATA_FIELD_LABELS: [&str; 10] = [
    "Document No",
    "Surname",
    "Given Names",
    "Nationality",
    "Sex",
    "Date of Birth",
    "Place of Birth",
    "Date of Issue",
    "Date of Expiry",
    "Issuer Code",
];

pub const DEFAULT_FILLER_PAGES: usize = 6;
pub const FILLER_COLUMNS: usize = 2;
pub const FILLER_ROWS: usize = 3;

/// Pages before the first filler page (cover and data page).
const LEADING_PAGES: usize = 2;

const COVER_WATERMARK: &str = "SAMPLE FICTIONAL";
const DATA_WATERMARK: &str = "SAMPLE FICTIONAL NO LEGAL VALUE";
const COVER_FOOTER: &str = "FICTIONAL SAMPLE NO LEGAL VALUE";

// Data page layout.
const HEADER_BAND_TOP: f64 = 50.0;
const HEADER_BAND_HEIGHT: f64 = 110.0;
const PHOTO_FRAME: (f64, f64, f64, f64) = (60.0, 390.0, 150.0, 190.0);
const PHOTO_INSET: f64 = 3.0;
const ROWS_X: f64 = 230.0;
const ROWS_TOP: f64 = 220.0;
const ROW_HEIGHT: f64 = 18.0;
const VALUE_OFFSET: f64 = 150.0;
const MRZ_BOX: (f64, f64, f64) = (60.0, 160.0, 80.0);
const MRZ_BASELINES: [f64; 2] = [207.0, 183.0];
const QR_BOX_EDGE: f64 = 120.0;
const QR_INSET: f64 = 5.0;

// Filler page layout.
const GRID_MARGIN_X: f64 = 60.0;
const GRID_BOTTOM: f64 = 100.0;
const GRID_TOP_MARGIN: f64 = 120.0;
const GRID_GAP: f64 = 16.0;

/// Fixed/rolling radius ratios `p / q` (coprime) for the stamp rosettes;
/// each curve closes after `q` revolutions.
const STAMP_RATIOS: [(f64, f64); FILLER_COLUMNS * FILLER_ROWS] =
    [(10.0, 3.0), (7.0, 2.0), (9.0, 4.0), (11.0, 3.0), (8.0, 3.0), (12.0, 5.0)];

/// Builds every page of a credential from one style configuration.
#[derive(Debug, Clone)]
pub struct PageComposer {
    size: Size,
    style: StyleConfig,
    filler_pages: usize,
    primitive_budget: usize,
    watermark: WatermarkGrid,
}

impl Default for PageComposer {
    fn default() -> Self {
        Self::new(&Style::default())
    }
}

impl PageComposer {
    pub fn new(style: &Style) -> Self {
        Self {
            size: Size::A4,
            style: style.resolve(),
            filler_pages: DEFAULT_FILLER_PAGES,
            primitive_budget: DEFAULT_PRIMITIVE_BUDGET,
            watermark: WatermarkGrid::default(),
        }
    }

    pub fn with_filler_pages(mut self, count: usize) -> Self {
        self.filler_pages = count;
        self
    }

    pub fn with_primitive_budget(mut self, budget: usize) -> Self {
        self.primitive_budget = budget;
        self
    }

    pub fn with_page_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn filler_pages(&self) -> usize {
        self.filler_pages
    }

    /// Render the whole booklet. Filler pages are composed in parallel.
    pub fn compose(
        &self,
        record: &DocumentRecord,
        photo: Raster,
        qr: Raster,
    ) -> Result<RenderedDocument, RenderError> {
        let mut pages = Vec::with_capacity(LEADING_PAGES + self.filler_pages);
        pages.push(self.cover(record)?);
        pages.push(self.data_page(record)?);
        let fillers = (0..self.filler_pages)
            .into_par_iter()
            .map(|i| self.filler_page(LEADING_PAGES + 1 + i, record))
            .collect::<Result<Vec<_>, _>>()?;
        pages.extend(fillers);
        tracing::debug!(
            document_number = %record.document_number(),
            pages = pages.len(),
            "composed document pages"
        );
        Ok(RenderedDocument::new(pages, photo, qr))
    }

    pub fn cover(&self, record: &DocumentRecord) -> Result<Page, RenderError> {
        let mut canvas = self.canvas("cover");
        self.draw_cover(&mut canvas, record);
        canvas.finish()
    }

    pub fn data_page(&self, record: &DocumentRecord) -> Result<Page, RenderError> {
        let mut canvas = self.canvas("data");
        self.draw_data_page(&mut canvas, record);
        canvas.finish()
    }

    /// `page_number` is the 1-based position in the booklet.
    pub fn filler_page(&self, page_number: usize, record: &DocumentRecord) -> Result<Page, RenderError> {
        let mut canvas = self.canvas(format!("page-{page_number}"));
        self.draw_filler_page(&mut canvas, page_number, record);
        canvas.finish()
    }

    fn canvas(&self, label: impl Into<String>) -> PageCanvas {
        PageCanvas::with_budget(label, self.size, self.primitive_budget)
    }

    // -----------------------------------------------------------------------
    // Cover
    // -----------------------------------------------------------------------

    pub fn draw_cover<S: DrawingSurface + ?Sized>(&self, s: &mut S, record: &DocumentRecord) {
        let Size { width: w, height: h } = self.size;
        let palette = &self.style.palette;
        let page = Rect::page(self.size);

        s.mark("section", "background");
        s.fill_rect(page, palette.cover_background, 1.0);

        s.mark("section", "border");
        s.stroke_rect(page.inset(30.0), palette.accent, 1.2, 0.8);
        s.stroke_rect(page.inset(38.0), palette.accent, 0.5, 0.6);
        if self.style.motifs.perforation {
            for tick in spine_ticks(12.0, 60.0, h - 60.0, 18.0, 6.0) {
                s.stroke_path(&tick, palette.accent, 0.4, 0.5);
            }
        }

        s.mark("section", "rosette");
        let center = Point::new(w / 2.0, 330.0);
        let rosettes = [
            RosetteParams {
                center,
                fixed_radius: 110.0,
                rolling_radius: 33.0,
                pen_offset: 55.0,
                revolutions: 3.0,
                samples: self.style.rosette_samples,
                closed: true,
            },
            RosetteParams {
                center,
                fixed_radius: 80.0,
                rolling_radius: 24.0,
                pen_offset: 40.0,
                revolutions: 3.0,
                samples: self.style.rosette_samples,
                closed: true,
            },
        ];
        for params in rosettes.iter().take(self.style.cover_rosettes.clamp(1, 2)) {
            s.stroke_path(&rosette(params), palette.accent, 0.35, 0.55);
        }

        s.mark("section", "title");
        let title = TextStyle::new(Font::Bold, 34.0).color(palette.accent);
        self.centered_text(s, h - 240.0, "PASSPORT", &title);
        let issuer = TextStyle::new(Font::Bold, 14.0).color(palette.accent);
        self.centered_text(s, h - 280.0, &record.issuer().name.to_uppercase(), &issuer);
        let footer = TextStyle::new(Font::Regular, 10.0).color(Color::WHITE).opacity(0.8);
        self.centered_text(s, 90.0, COVER_FOOTER, &footer);

        self.draw_watermark(s, COVER_WATERMARK);
    }

    // -----------------------------------------------------------------------
    // Data page
    // -----------------------------------------------------------------------

    pub fn draw_data_page<S: DrawingSurface + ?Sized>(&self, s: &mut S, record: &DocumentRecord) {
        let Size { width: w, height: h } = self.size;
        let palette = &self.style.palette;

        s.mark("section", "background");
        s.fill_rect(Rect::page(self.size), palette.data_background, 1.0);
        if self.style.motifs.gradient {
            let band = Rect::new(0.0, h - 45.0, w, 45.0);
            for (strip, color) in
                gradient_band(band, palette.band_from, palette.band_to, self.style.gradient_steps)
            {
                s.fill_rect(strip, color, 1.0);
            }
        }

        s.mark("section", "header");
        s.fill_rect(
            Rect::new(40.0, h - HEADER_BAND_TOP - HEADER_BAND_HEIGHT, w - 80.0, HEADER_BAND_HEIGHT),
            palette.header_band,
            1.0,
        );
        s.draw_text(
            Point::new(58.0, h - 92.0),
            "PERSONAL DATA",
            &TextStyle::new(Font::Bold, 16.0).color(Color::WHITE),
        );
        s.draw_text(
            Point::new(58.0, h - 116.0),
            &record.issuer().disclaimer,
            &TextStyle::new(Font::Regular, 10.0).color(Color::WHITE),
        );

        if self.style.motifs.waves {
            s.mark("section", "waves");
            for i in 0..self.style.wave_count {
                let k = i as f64;
                let line = wave(&WaveParams {
                    x_start: 40.0,
                    x_end: w - 40.0,
                    baseline: 285.0 + 9.0 * k,
                    amplitude: 5.0,
                    frequency: 5.0 + k,
                    phase: 0.7 * k,
                    samples: self.style.wave_samples,
                });
                s.stroke_path(&line, palette.line_work, 0.4, 0.35);
            }
        }

        if self.style.motifs.microtext {
            s.mark("section", "microtext");
            let phrase = format!(
                "{} {}",
                record.issuer().name.to_uppercase(),
                record.issuer().disclaimer
            );
            let stamps = microtext_block(
                s.metrics(),
                &MicrotextParams {
                    origin: Point::new(60.0, 262.0),
                    width: w - 120.0,
                    lines: self.style.microtext_lines,
                    line_gap: 4.5,
                    phrase: &phrase,
                    size: 3.2,
                    opacity: 0.45,
                    color: palette.line_work,
                },
            );
            draw_stamps(s, &stamps);
        }

        s.mark("section", "photo");
        let (fx, fy, fw, fh) = PHOTO_FRAME;
        let frame = Rect::new(fx, h - fy, fw, fh);
        s.stroke_rect(frame, palette.ink, 1.0, 1.0);
        s.draw_image(frame.inset(PHOTO_INSET), ImageSlot::Photo);

        s.mark("section", "fields");
        let label_style = TextStyle::new(Font::Bold, 10.0).color(palette.ink);
        let value_style = TextStyle::new(Font::Regular, 10.0).color(palette.ink);
        let mut y = h - ROWS_TOP;
        for (label, value) in DATA_FIELD_LABELS.iter().zip(field_values(record)) {
            s.mark("field", label);
            s.draw_text(Point::new(ROWS_X, y), &format!("{label}:"), &label_style);
            s.draw_text(Point::new(ROWS_X + VALUE_OFFSET, y), &value, &value_style);
            y -= ROW_HEIGHT;
        }

        s.mark("section", "mrz");
        let (mx, my, mh) = MRZ_BOX;
        s.stroke_rect(Rect::new(mx, my, w - 2.0 * mx, mh), palette.ink, 1.0, 1.0);
        let mono = TextStyle::new(Font::Mono, 12.0).color(palette.ink);
        let mrz = record.mrz();
        for (line, baseline) in [&mrz.line1, &mrz.line2].into_iter().zip(MRZ_BASELINES) {
            s.draw_text(Point::new(mx + 10.0, baseline), line, &mono);
        }

        s.mark("section", "qr");
        let qr_box = Rect::new(w - 50.0 - QR_BOX_EDGE, 30.0, QR_BOX_EDGE, QR_BOX_EDGE);
        s.stroke_rect(qr_box, palette.ink, 1.0, 1.0);
        s.draw_image(qr_box.inset(QR_INSET), ImageSlot::Qr);
        s.draw_text(
            Point::new(60.0, 54.0),
            "Verify at /verify",
            &TextStyle::new(Font::Regular, 9.0).color(palette.ink),
        );

        self.draw_watermark(s, DATA_WATERMARK);
    }

    // -----------------------------------------------------------------------
    // Filler pages
    // -----------------------------------------------------------------------

    pub fn draw_filler_page<S: DrawingSurface + ?Sized>(
        &self,
        s: &mut S,
        page_number: usize,
        record: &DocumentRecord,
    ) {
        let Size { width: w, height: h } = self.size;
        let palette = &self.style.palette;

        s.mark("section", "background");
        s.fill_rect(Rect::page(self.size), palette.filler_background, 1.0);

        s.mark("section", "header");
        s.draw_text(
            Point::new(60.0, h - 80.0),
            "VISA PAGE SAMPLE",
            &TextStyle::new(Font::Bold, 14.0).color(palette.ink),
        );
        s.draw_text(
            Point::new(w - 120.0, h - 80.0),
            &format!("PAGE {page_number}"),
            &TextStyle::new(Font::Bold, 10.0).color(palette.ink),
        );

        s.mark("section", "grid");
        let cell_w = (w - 2.0 * GRID_MARGIN_X - GRID_GAP * (FILLER_COLUMNS - 1) as f64)
            / FILLER_COLUMNS as f64;
        let cell_h = (h - GRID_TOP_MARGIN - GRID_BOTTOM - GRID_GAP * (FILLER_ROWS - 1) as f64)
            / FILLER_ROWS as f64;
        let stamp_label = TextStyle::new(Font::Bold, 9.0).color(palette.ink).opacity(0.3);
        for row in 0..FILLER_ROWS {
            for col in 0..FILLER_COLUMNS {
                let x = GRID_MARGIN_X + col as f64 * (cell_w + GRID_GAP);
                // Row 0 is the top row.
                let y = h - GRID_TOP_MARGIN - (row + 1) as f64 * cell_h - row as f64 * GRID_GAP;
                let cell = Rect::new(x, y, cell_w, cell_h);
                s.mark("stamp", &format!("{}-{}", row + 1, col + 1));
                s.stroke_rect(cell, palette.ink, 0.6, 0.4);
                s.draw_text(Point::new(x + 10.0, y + cell_h - 20.0), "SAMPLE STAMP", &stamp_label);

                let (p, q) = STAMP_RATIOS[row * FILLER_COLUMNS + col];
                let fixed = cell_w.min(cell_h) * 0.32;
                let line = rosette(&RosetteParams {
                    center: cell.center(),
                    fixed_radius: fixed,
                    rolling_radius: fixed * q / p,
                    pen_offset: fixed * 0.45,
                    revolutions: q,
                    samples: self.style.stamp_rosette_samples,
                    closed: true,
                });
                s.stroke_path(&line, palette.line_work, 0.3, 0.25);
            }
        }

        if self.style.motifs.microtext {
            s.mark("section", "microtext");
            let phrase = format!("{} {}", record.issuer().name.to_uppercase(), COVER_FOOTER);
            let stamps = microtext_block(
                s.metrics(),
                &MicrotextParams {
                    origin: Point::new(60.0, 70.0),
                    width: w - 120.0,
                    lines: self.style.microtext_lines,
                    line_gap: 4.5,
                    phrase: &phrase,
                    size: 3.2,
                    opacity: 0.45,
                    color: palette.line_work,
                },
            );
            draw_stamps(s, &stamps);
        }

        if self.style.motifs.perforation {
            s.mark("section", "perforation");
            for center in perforation_dots(w - 18.0, 40.0, h - 40.0, 14.0) {
                s.fill_circle(center, 1.4, palette.ink, 0.25);
            }
        }

        self.draw_watermark(s, COVER_WATERMARK);
    }

    // -----------------------------------------------------------------------
    // Shared pieces
    // -----------------------------------------------------------------------

    fn draw_watermark<S: DrawingSurface + ?Sized>(&self, s: &mut S, text: &str) {
        s.mark("section", "watermark");
        draw_stamps(s, &watermark_tiles(self.size, text, &self.watermark));
    }

    fn centered_text<S: DrawingSurface + ?Sized>(&self, s: &mut S, y: f64, text: &str, style: &TextStyle) {
        let width = s.metrics().text_width(style.font, style.size, text);
        let x = ((self.size.width - width) / 2.0).max(0.0);
        s.draw_text(Point::new(x, y), text, style);
    }
}

fn draw_stamps<S: DrawingSurface + ?Sized>(s: &mut S, stamps: &[TextStamp]) {
    for stamp in stamps {
        s.draw_text(stamp.origin, &stamp.text, &stamp.style);
    }
}

/// Values for [`DATA_FIELD_LABELS`], in the same order, as entered.
pub fn field_values(record: &DocumentRecord) -> [String; 10] {
    let subject = record.subject();
    [
        record.document_number().to_string(),
        subject.surname.clone(),
        subject.given_names.clone(),
        subject.nationality.clone(),
        subject.sex.to_string(),
        subject.date_of_birth.clone(),
        subject.place_of_birth.clone(),
        record.issue_date().to_string(),
        record.expiry_date().to_string(),
        record.issuer().code.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Command;
    use crate::raster::PixelData;
    use crate::style::Density;
    use spl_core::{DocumentNumber, IssuerProfile, Subject, Timestamp};

    fn record() -> DocumentRecord {
        DocumentRecord::new(
            IssuerProfile::default(),
            Subject::default(),
            DocumentNumber::parse("SPL-000123").unwrap(),
            "2025-01-01",
            "2035-01-01",
            Timestamp::parse("2025-01-01T12:00:00Z").unwrap(),
        )
    }

    fn gray(edge: u32) -> Raster {
        Raster::new(edge, edge, PixelData::Gray(vec![0; (edge * edge) as usize])).unwrap()
    }

    fn last_section(page: &Page) -> Option<&str> {
        page.marks("section").last()
    }

    fn texts(commands: &[Command]) -> Vec<&str> {
        commands
            .iter()
            .filter_map(|c| match c {
                Command::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_page_order_and_count() {
        let doc = PageComposer::default().compose(&record(), gray(4), gray(4)).unwrap();
        let labels: Vec<&str> = doc.pages().iter().map(Page::label).collect();
        assert_eq!(
            labels,
            ["cover", "data", "page-3", "page-4", "page-5", "page-6", "page-7", "page-8"]
        );
    }

    #[test]
    fn test_data_page_rows_in_order() {
        let page = PageComposer::default().data_page(&record()).unwrap();
        let fields: Vec<&str> = page.marks("field").collect();
        assert_eq!(fields, DATA_FIELD_LABELS);

        let rows = texts(page.section("section", "fields"));
        assert_eq!(rows.len(), 20);
        assert_eq!(rows[0], "Document No:");
        assert_eq!(rows[1], "SPL-000123");
        assert_eq!(rows[19], "XAA");
    }

    #[test]
    fn test_data_page_has_one_photo_one_qr() {
        let page = PageComposer::default().data_page(&record()).unwrap();
        let images: Vec<ImageSlot> = page
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::Image { slot, .. } => Some(*slot),
                _ => None,
            })
            .collect();
        assert_eq!(images, [ImageSlot::Photo, ImageSlot::Qr]);
    }

    #[test]
    fn test_mrz_drawn_in_mono() {
        let page = PageComposer::default().data_page(&record()).unwrap();
        let mrz: Vec<&Command> = page
            .section("section", "mrz")
            .iter()
            .filter(|c| matches!(c, Command::Text { .. }))
            .collect();
        assert_eq!(mrz.len(), 2);
        for c in mrz {
            if let Command::Text { text, style, .. } = c {
                assert_eq!(style.font, Font::Mono);
                assert_eq!(text.len(), 44);
            }
        }
    }

    #[test]
    fn test_watermark_is_last_on_every_page() {
        for style in [Style::Classic, Style::Guilloche { density: Density::Dense }] {
            let doc = PageComposer::new(&style).compose(&record(), gray(4), gray(4)).unwrap();
            for page in doc.pages() {
                assert_eq!(last_section(page), Some("watermark"), "{}", page.label());
                let tail = page.section("section", "watermark");
                assert!(!tail.is_empty());
                assert!(tail.iter().all(|c| matches!(
                    c,
                    Command::Text { style, .. } if style.rotation_deg == 25.0
                )));
                assert!(matches!(page.commands().last(), Some(Command::Text { .. })));
            }
        }
    }

    #[test]
    fn test_filler_grid_is_two_by_three() {
        let page = PageComposer::default().filler_page(5, &record()).unwrap();
        let stamps: Vec<&str> = page.marks("stamp").collect();
        assert_eq!(stamps, ["1-1", "1-2", "2-1", "2-2", "3-1", "3-2"]);
        assert!(texts(page.commands()).contains(&"PAGE 5"));
        let boxes = page
            .section("section", "grid")
            .iter()
            .filter(|c| matches!(c, Command::StrokeRect { .. }))
            .count();
        assert_eq!(boxes, 6);
        let rosettes = page
            .section("section", "grid")
            .iter()
            .filter(|c| matches!(c, Command::StrokePath { .. }))
            .count();
        assert_eq!(rosettes, 6);
    }

    #[test]
    fn test_filler_cells_stay_on_page() {
        let page = PageComposer::default().filler_page(3, &record()).unwrap();
        for c in page.section("section", "grid") {
            if let Command::StrokeRect { rect, .. } = c {
                assert!(rect.x >= 0.0 && rect.y >= 0.0);
                assert!(rect.x + rect.width <= Size::A4.width);
                assert!(rect.y + rect.height <= Size::A4.height);
            }
        }
    }

    #[test]
    fn test_cover_rosette_count_follows_style() {
        let classic = PageComposer::new(&Style::Classic).cover(&record()).unwrap();
        let guilloche = PageComposer::new(&Style::Guilloche { density: Density::Normal })
            .cover(&record())
            .unwrap();
        let count = |p: &Page| {
            p.section("section", "rosette")
                .iter()
                .filter(|c| matches!(c, Command::StrokePath { .. }))
                .count()
        };
        assert_eq!(count(&classic), 1);
        assert_eq!(count(&guilloche), 2);
    }

    #[test]
    fn test_cover_title_uses_issuer_name() {
        let cover = PageComposer::default().cover(&record()).unwrap();
        let titles = texts(cover.section("section", "title"));
        assert_eq!(titles, ["PASSPORT", "REPUBLIC OF SAMPLELAND", "FICTIONAL SAMPLE NO LEGAL VALUE"]);
    }

    #[test]
    fn test_filler_page_count_configurable() {
        let doc = PageComposer::default()
            .with_filler_pages(2)
            .compose(&record(), gray(2), gray(2))
            .unwrap();
        assert_eq!(doc.pages().len(), 4);
        assert_eq!(doc.pages()[3].label(), "page-4");
    }

    #[test]
    fn test_tight_budget_fails() {
        let err = PageComposer::default()
            .with_primitive_budget(10)
            .compose(&record(), gray(2), gray(2))
            .unwrap_err();
        assert!(matches!(err, RenderError::PrimitiveBudgetExceeded { ref page, .. } if page == "cover"));
    }

    #[test]
    fn test_every_page_within_default_budget() {
        let composer = PageComposer::new(&Style::Guilloche { density: Density::Dense });
        let doc = composer.compose(&record(), gray(2), gray(2)).unwrap();
        for page in doc.pages() {
            assert!(page.primitive_count() <= DEFAULT_PRIMITIVE_BUDGET);
        }
    }

    #[test]
    fn test_field_values_as_entered() {
        let mut r = record();
        r.update_subject(|s| s.given_names = "Mary  Ann".into());
        assert_eq!(field_values(&r)[2], "Mary  Ann");
    }
}

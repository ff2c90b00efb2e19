//! End-to-end issuance through the default collaborators: real PNG/JPEG
//! decoding, real QR encoding, composition and PDF output.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use spl_bundle::{inspect, verify_encoded, Bundle};
use spl_issuer::{IssueRequest, Issuer, IssuerConfig};
use spl_render::{Command, Density, ImageSlot, PixelData, Style, DATA_FIELD_LABELS};

fn photo_url(format: image::ImageFormat, mime: &str) -> String {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_fn(24, 32, |x, y| {
        image::Rgb([(x * 10) as u8, (y * 7) as u8, 128])
    }));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    format!("data:{mime};base64,{}", STANDARD.encode(buf.into_inner()))
}

fn request(photo: String) -> IssueRequest {
    IssueRequest {
        surname: Some("Doe".into()),
        given_names: Some("Jane Alice".into()),
        sex: Some("F".into()),
        date_of_birth: Some("1988-02-29".into()),
        photo_data_url: Some(photo),
        ..Default::default()
    }
}

fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

#[test]
fn png_issuance_end_to_end() {
    let issuance = Issuer::default()
        .issue(&request(photo_url(image::ImageFormat::Png, "image/png")))
        .unwrap();

    // Bundle verifies both decoded and from its wire string.
    assert!(spl_bundle::verify(&issuance.bundle).unwrap());
    assert!(verify_encoded(&issuance.bundle_base64).unwrap());
    let report = inspect(&issuance.bundle).unwrap();
    assert!(report.is_ok());
    assert_eq!(report.payload_digest.len(), 64);

    // Record fields as entered, MRZ normalized.
    let record = issuance.record();
    assert_eq!(record.subject().surname, "Doe");
    assert!(record.mrz().line1.starts_with("P<XAA<DOE<<JANE<ALICE<"));
    assert!(record.mrz().is_well_formed());

    // PNG photos are embedded as raw RGB.
    assert!(matches!(
        issuance.document.raster(ImageSlot::Photo).pixels(),
        PixelData::Rgb(_)
    ));

    // Eight pages in the PDF: cover, data, six filler pages.
    assert!(issuance.pdf.starts_with(b"%PDF-1.4"));
    assert_eq!(count(&issuance.pdf, b"/Type /Page /Parent"), 8);
    assert_eq!(count(&issuance.pdf, b"/Im1 Do"), 1);
    assert_eq!(count(&issuance.pdf, b"/Im2 Do"), 1);
}

#[test]
fn jpeg_photo_passes_through() {
    let issuance = Issuer::default()
        .issue(&request(photo_url(image::ImageFormat::Jpeg, "image/jpeg")))
        .unwrap();
    assert!(matches!(
        issuance.document.raster(ImageSlot::Photo).pixels(),
        PixelData::Dct { gray: false, .. }
    ));
    assert_eq!(count(&issuance.pdf, b"/DCTDecode"), 1);
}

#[test]
fn data_page_contract() {
    let issuance = Issuer::default()
        .issue(&request(photo_url(image::ImageFormat::Png, "image/png")))
        .unwrap();
    let pages = issuance.document.pages();
    let labels: Vec<&str> = pages.iter().map(|p| p.label()).collect();
    assert_eq!(
        labels,
        ["cover", "data", "page-3", "page-4", "page-5", "page-6", "page-7", "page-8"]
    );

    let data = &pages[1];
    let slots: Vec<ImageSlot> = data
        .commands()
        .iter()
        .filter_map(|c| match c {
            Command::Image { slot, .. } => Some(*slot),
            _ => None,
        })
        .collect();
    assert_eq!(slots, [ImageSlot::Photo, ImageSlot::Qr]);
    assert_eq!(data.marks("field").collect::<Vec<_>>(), DATA_FIELD_LABELS);

    for page in pages {
        assert_eq!(page.marks("section").last(), Some("watermark"), "{}", page.label());
    }
    for (i, page) in pages.iter().enumerate().skip(2) {
        assert_eq!(page.marks("stamp").count(), 6);
        let header = format!("PAGE {}", i + 1);
        assert!(page
            .commands()
            .iter()
            .any(|c| matches!(c, Command::Text { text, .. } if *text == header)));
    }
}

#[test]
fn qr_carries_the_bundle_string() {
    let issuance = Issuer::default()
        .issue(&request(photo_url(image::ImageFormat::Png, "image/png")))
        .unwrap();
    let qr = issuance.document.raster(ImageSlot::Qr);
    assert!(matches!(qr.pixels(), PixelData::Gray(_)));
    assert_eq!(qr.width(), qr.height());

    let decoded = Bundle::from_base64(&issuance.bundle_base64).unwrap();
    assert_eq!(decoded, issuance.bundle);
}

#[test]
fn guilloche_style_issuance() {
    let config = IssuerConfig {
        style: Style::Guilloche {
            density: Density::Dense,
        },
        filler_pages: 2,
        ..Default::default()
    };
    let issuance = Issuer::new(config)
        .issue(&request(photo_url(image::ImageFormat::Png, "image/png")))
        .unwrap();
    assert_eq!(issuance.document.pages().len(), 4);
    assert_eq!(count(&issuance.pdf, b"/Type /Page /Parent"), 4);
    assert!(issuance.document.pages()[3].marks("section").any(|s| s == "perforation"));
}

#[test]
fn batch_issuance_is_independent() {
    let requests: Vec<IssueRequest> = (0..4)
        .map(|_| request(photo_url(image::ImageFormat::Png, "image/png")))
        .collect();
    let results = Issuer::default().issue_batch(&requests);
    let keys: Vec<_> = results
        .iter()
        .map(|r| r.as_ref().unwrap().bundle.public_key)
        .collect();
    for (i, a) in keys.iter().enumerate() {
        for b in &keys[i + 1..] {
            assert_ne!(a, b, "every issuance uses its own key pair");
        }
    }
}

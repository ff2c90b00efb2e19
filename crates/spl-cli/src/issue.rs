//! # Issue Subcommand
//!
//! Reads a photo file and an optional request JSON, issues one credential
//! and writes `<filename>.pdf` plus `<filename>.bundle.txt` (the base64
//! bundle string) to the output directory. A JSON summary goes to stdout.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::Args;
use serde_json::json;
use spl_issuer::{IssueRequest, Issuer};

use crate::config::CliConfig;

/// Arguments for `spl issue`.
#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Photo of the holder (PNG or JPEG).
    #[arg(long)]
    pub photo: PathBuf,

    /// Request JSON with optional subject fields (`surname`, `givenNames`,
    /// `nationality`, `sex`, `dob`, `pob`, `doi`, `doe`).
    #[arg(long)]
    pub request: Option<PathBuf>,

    /// Override the surname from the request file.
    #[arg(long)]
    pub surname: Option<String>,

    /// Override the given names from the request file.
    #[arg(long)]
    pub given_names: Option<String>,

    /// Override the sex marker (M, F or X).
    #[arg(long)]
    pub sex: Option<String>,
}

/// Execute `spl issue`. Returns the process exit code.
pub fn run_issue(args: &IssueArgs, config: &CliConfig, output_dir: &Path) -> Result<u8> {
    let mut request = match &args.request {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read request: {}", path.display()))?;
            serde_json::from_str::<IssueRequest>(&text)
                .with_context(|| format!("failed to parse request JSON: {}", path.display()))?
        }
        None => IssueRequest::default(),
    };
    if args.surname.is_some() {
        request.surname = args.surname.clone();
    }
    if args.given_names.is_some() {
        request.given_names = args.given_names.clone();
    }
    if args.sex.is_some() {
        request.sex = args.sex.clone();
    }
    request.photo_data_url = Some(photo_data_url(&args.photo)?);

    let issuer = Issuer::new(config.issuance.clone());
    let issuance = issuer.issue(&request).context("issuance failed")?;

    std::fs::create_dir_all(output_dir).with_context(|| {
        format!("failed to create output directory: {}", output_dir.display())
    })?;
    let pdf_path = output_dir.join(&issuance.filename);
    let bundle_path = pdf_path.with_extension("bundle.txt");
    std::fs::write(&pdf_path, &issuance.pdf)
        .with_context(|| format!("failed to write PDF: {}", pdf_path.display()))?;
    std::fs::write(&bundle_path, &issuance.bundle_base64)
        .with_context(|| format!("failed to write bundle: {}", bundle_path.display()))?;

    let record = issuance.record();
    let summary = json!({
        "filename": issuance.filename,
        "pdf": pdf_path.display().to_string(),
        "bundle": bundle_path.display().to_string(),
        "documentNumber": record.document_number().as_str(),
        "mrz": [record.mrz().line1, record.mrz().line2],
        "publicKey": issuance.bundle.public_key.to_base64(),
        "pages": issuance.document.pages().len(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(0)
}

/// Build a `data:` URL from a photo file, choosing the media type by
/// extension.
pub fn photo_data_url(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        other => bail!("unsupported photo type {other:?}: expected .png, .jpg or .jpeg"),
    };
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read photo: {}", path.display()))?;
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spl_bundle::Bundle;
    use std::io::Cursor;

    fn write_png(dir: &Path) -> PathBuf {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            8,
            10,
            image::Rgb([90, 120, 150]),
        ));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        let path = dir.join("photo.png");
        std::fs::write(&path, buf.into_inner()).unwrap();
        path
    }

    fn args(photo: PathBuf) -> IssueArgs {
        IssueArgs {
            photo,
            request: None,
            surname: None,
            given_names: None,
            sex: None,
        }
    }

    fn only_file_with_suffix(dir: &Path, suffix: &str) -> PathBuf {
        let mut found: Vec<PathBuf> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.to_string_lossy().ends_with(suffix))
            .collect();
        assert_eq!(found.len(), 1, "{suffix}");
        found.remove(0)
    }

    #[test]
    fn issue_writes_pdf_and_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let code = run_issue(&args(write_png(dir.path())), &CliConfig::default(), &out).unwrap();
        assert_eq!(code, 0);

        let pdf = std::fs::read(only_file_with_suffix(&out, ".pdf")).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
        let bundle_text = std::fs::read_to_string(only_file_with_suffix(&out, ".bundle.txt")).unwrap();
        let bundle = Bundle::from_base64(&bundle_text).unwrap();
        assert!(spl_bundle::verify(&bundle).unwrap());
    }

    #[test]
    fn request_file_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let req_path = dir.path().join("req.json");
        std::fs::write(&req_path, r#"{"surname":"ROE","givenNames":"ALEX","sex":"M"}"#).unwrap();
        let out = dir.path().join("out");
        let mut a = args(write_png(dir.path()));
        a.request = Some(req_path);
        a.sex = Some("F".into());
        run_issue(&a, &CliConfig::default(), &out).unwrap();

        let bundle_text = std::fs::read_to_string(only_file_with_suffix(&out, ".bundle.txt")).unwrap();
        let bundle = Bundle::from_base64(&bundle_text).unwrap();
        let subject = bundle.payload.subject();
        assert_eq!(subject.surname, "ROE");
        assert_eq!(subject.given_names, "ALEX");
        assert_eq!(subject.sex.code(), 'F');
    }

    #[test]
    fn unsupported_photo_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.gif");
        std::fs::write(&path, b"GIF89a").unwrap();
        let err = photo_data_url(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported photo type"));
    }

    #[test]
    fn data_url_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let url = photo_data_url(&write_png(dir.path())).unwrap();
        assert!(url.starts_with("data:image/png;base64,iVBOR"));
    }
}

//! # Issuance Pipeline
//!
//! request → record (defaults, MRZ) → photo raster → signed bundle →
//! base64 bundle → QR raster → composed pages → PDF bytes.
//!
//! An [`Issuer`] holds no per-request state; every call draws its own
//! document number and (unless one is injected) its own key pair, so calls
//! may run concurrently. A failed call returns its error and nothing else.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use spl_bundle::Bundle;
use spl_core::{DocumentNumber, DocumentRecord, IssuerProfile, Timestamp};
use spl_crypto::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use spl_render::{
    write_pdf, EcLevel, ImagePhotoDecoder, PageComposer, PhotoDecoder, QrCodeEncoder, QrEncoder,
    RenderError, RenderedDocument, Style, DEFAULT_FILLER_PAGES,
};

use crate::error::IssueError;
use crate::request::IssueRequest;

/// Settings shared by every issuance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuerConfig {
    pub issuer: IssuerProfile,
    pub style: Style,
    pub filler_pages: usize,
    pub qr_level: EcLevel,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            issuer: IssuerProfile::default(),
            style: Style::default(),
            filler_pages: DEFAULT_FILLER_PAGES,
            qr_level: EcLevel::default(),
        }
    }
}

/// Everything one issuance produced.
#[derive(Debug, Clone)]
pub struct Issuance {
    pub filename: String,
    pub pdf: Vec<u8>,
    pub bundle: Bundle,
    pub bundle_base64: String,
    pub document: RenderedDocument,
}

impl Issuance {
    pub fn record(&self) -> &DocumentRecord {
        &self.bundle.payload
    }

    pub fn to_response(&self) -> IssueResponse {
        IssueResponse {
            filename: self.filename.clone(),
            pdf_base64: STANDARD.encode(&self.pdf),
            bundle_base64: self.bundle_base64.clone(),
            payload: self.bundle.payload.clone(),
            signature: self.bundle.signature,
            public_key: self.bundle.public_key,
        }
    }
}

/// JSON body returned to callers of the request handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
    pub filename: String,
    pub pdf_base64: String,
    pub bundle_base64: String,
    pub payload: DocumentRecord,
    pub signature: Ed25519Signature,
    pub public_key: Ed25519PublicKey,
}

pub fn filename_for(number: &DocumentNumber) -> String {
    format!("fictional-passport-{number}.pdf")
}

pub struct Issuer {
    config: IssuerConfig,
    composer: PageComposer,
    photo_decoder: Arc<dyn PhotoDecoder>,
    qr_encoder: Arc<dyn QrEncoder>,
}

impl std::fmt::Debug for Issuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Issuer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Issuer {
    fn default() -> Self {
        Self::new(IssuerConfig::default())
    }
}

impl Issuer {
    pub fn new(config: IssuerConfig) -> Self {
        let composer = PageComposer::new(&config.style).with_filler_pages(config.filler_pages);
        Self {
            config,
            composer,
            photo_decoder: Arc::new(ImagePhotoDecoder::default()),
            qr_encoder: Arc::new(QrCodeEncoder::default()),
        }
    }

    pub fn with_photo_decoder(mut self, decoder: impl PhotoDecoder + 'static) -> Self {
        self.photo_decoder = Arc::new(decoder);
        self
    }

    pub fn with_qr_encoder(mut self, encoder: impl QrEncoder + 'static) -> Self {
        self.qr_encoder = Arc::new(encoder);
        self
    }

    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }

    /// Issue one credential signed with a fresh single-use key pair.
    pub fn issue(&self, request: &IssueRequest) -> Result<Issuance, IssueError> {
        self.issue_with_key(request, &Ed25519KeyPair::generate())
    }

    /// Issue one credential signed with `key`.
    pub fn issue_with_key(
        &self,
        request: &IssueRequest,
        key: &Ed25519KeyPair,
    ) -> Result<Issuance, IssueError> {
        let photo_url = request.photo().ok_or(IssueError::MissingPhoto)?;
        let record = request.to_record(
            self.config.issuer.clone(),
            DocumentNumber::random(),
            Timestamp::now(),
        )?;
        self.issue_record(record, photo_url, key)
    }

    /// Sign, encode and render an already assembled record.
    pub fn issue_record(
        &self,
        record: DocumentRecord,
        photo_url: &str,
        key: &Ed25519KeyPair,
    ) -> Result<Issuance, IssueError> {
        let photo = self.photo_decoder.decode(photo_url).map_err(IssueError::Photo)?;

        let bundle = Bundle::build_with_key(record, key)?;
        let bundle_base64 = bundle.to_base64()?;
        let qr = self
            .qr_encoder
            .encode(bundle_base64.as_bytes(), self.config.qr_level)
            .map_err(RenderError::from)?;

        let document = self.composer.compose(&bundle.payload, photo, qr)?;
        let pdf = write_pdf(&document);
        let filename = filename_for(bundle.payload.document_number());

        tracing::info!(
            document_number = %bundle.payload.document_number(),
            pages = document.pages().len(),
            bytes = pdf.len(),
            "issued credential"
        );

        Ok(Issuance {
            filename,
            pdf,
            bundle,
            bundle_base64,
            document,
        })
    }

    /// Issue independent requests in parallel. Results keep input order.
    pub fn issue_batch(&self, requests: &[IssueRequest]) -> Vec<Result<Issuance, IssueError>> {
        let results: Vec<_> = requests.par_iter().map(|r| self.issue(r)).collect();
        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            tracing::warn!(total = requests.len(), failed, "batch issuance had failures");
        }
        results
    }
}

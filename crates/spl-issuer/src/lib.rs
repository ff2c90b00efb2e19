//! # spl-issuer: Credential Issuance
//!
//! Ties the workspace together: an [`IssueRequest`] becomes a signed
//! [`Bundle`](spl_bundle::Bundle), a QR of the bundle, rendered pages and
//! PDF bytes.
//!
//! - [`Issuer`] runs the pipeline for single requests and parallel batches.
//! - [`boundary::handle`] maps the pipeline onto request/response semantics
//!   (405 / 400 / 200) without tying it to a transport.

pub mod boundary;
pub mod error;
pub mod issue;
pub mod request;

pub use boundary::{handle, Response};
pub use error::IssueError;
pub use issue::{filename_for, Issuance, IssueResponse, Issuer, IssuerConfig};
pub use request::{IssueRequest, DEFAULT_EXPIRY_DATE, DEFAULT_ISSUE_DATE};

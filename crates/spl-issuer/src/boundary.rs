//! # Request Boundary
//!
//! Transport-agnostic request handling: a method string and a raw body in,
//! a status code and a body out. Any HTTP server (or a test) can sit in
//! front of [`handle`].
//!
//! | outcome            | status | body                          |
//! |--------------------|--------|-------------------------------|
//! | not `POST`         | 405    | `Method not allowed`          |
//! | no photo           | 400    | `Missing photo`               |
//! | other input error  | 400    | the error text                |
//! | internal failure   | 500    | the error text                |
//! | success            | 200    | JSON [`IssueResponse`](crate::IssueResponse) |

use spl_bundle::BundleError;

use crate::error::IssueError;
use crate::issue::Issuer;
use crate::request::IssueRequest;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_TEXT,
            body: body.into(),
        }
    }

    fn error(err: &IssueError) -> Self {
        Self::text(err.status_code(), err.to_string())
    }
}

/// Handle one issuance request. An empty body is treated as `{}`.
pub fn handle(issuer: &Issuer, method: &str, body: &[u8]) -> Response {
    if method != "POST" {
        return Response::error(&IssueError::MethodNotAllowed);
    }
    match respond(issuer, body) {
        Ok(json) => Response {
            status: 200,
            content_type: CONTENT_TYPE_JSON,
            body: json,
        },
        Err(err) => {
            if err.is_input_error() {
                tracing::debug!(error = %err, "rejected issuance request");
            } else {
                tracing::error!(error = %err, "issuance failed");
            }
            Response::error(&err)
        }
    }
}

fn respond(issuer: &Issuer, body: &[u8]) -> Result<String, IssueError> {
    let request = parse_request(body)?;
    let issuance = issuer.issue(&request)?;
    serde_json::to_string(&issuance.to_response())
        .map_err(|e| IssueError::Bundle(BundleError::Serialization(e.to_string())))
}

pub fn parse_request(body: &[u8]) -> Result<IssueRequest, IssueError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(IssueRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| IssueError::InvalidRequest(e.to_string()))
}

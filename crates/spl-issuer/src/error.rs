//! Issuance error taxonomy and its boundary status mapping.

use spl_bundle::BundleError;
use spl_core::SplError;
use spl_render::{RasterError, RenderError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IssueError {
    /// The handler was invoked with anything other than `POST`.
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Missing photo")]
    MissingPhoto,

    /// The request body is not a JSON object of the expected shape.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A request field failed validation (for example an unknown sex code).
    #[error(transparent)]
    Validation(#[from] SplError),

    /// The photo data URL is malformed, of an unsupported type, or does not
    /// decode.
    #[error(transparent)]
    Photo(RasterError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Bundle(#[from] BundleError),
}

impl IssueError {
    /// HTTP-equivalent status for the request boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            IssueError::MethodNotAllowed => 405,
            IssueError::MissingPhoto
            | IssueError::InvalidRequest(_)
            | IssueError::Validation(_)
            | IssueError::Photo(_) => 400,
            IssueError::Render(_) | IssueError::Bundle(_) => 500,
        }
    }

    /// Caller-supplied input was at fault.
    pub fn is_input_error(&self) -> bool {
        self.status_code() == 400
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(IssueError::MethodNotAllowed.status_code(), 405);
        assert_eq!(IssueError::MissingPhoto.status_code(), 400);
        assert_eq!(
            IssueError::Photo(RasterError::InvalidEncoding("x".into())).status_code(),
            400
        );
        let render: IssueError = RenderError::PrimitiveBudgetExceeded {
            page: "cover".into(),
            count: 2,
            budget: 1,
        }
        .into();
        assert_eq!(render.status_code(), 500);
        assert!(!render.is_input_error());
    }

    #[test]
    fn test_messages_pass_through() {
        assert_eq!(IssueError::MissingPhoto.to_string(), "Missing photo");
        let err = IssueError::Photo(RasterError::InvalidEncoding("missing comma".into()));
        assert_eq!(err.to_string(), "invalid data URL encoding: missing comma");
    }
}

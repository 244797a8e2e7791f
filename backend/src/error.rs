use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Every way a contact submission can be refused. Mail failures are not in here:
/// they are logged and never reach the caller.
#[derive(Error, Debug)]
pub enum ContactError {
    #[error("Method not allowed. Use POST.")]
    MethodNotAllowed,
    #[error("Missing required fields: name, email, message, consent")]
    MissingFields,
    #[error("Invalid email format")]
    InvalidEmail,
    /// Carries the detail for the log only.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ContactError {
    pub fn status(&self) -> StatusCode {
        match self {
            ContactError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ContactError::MissingFields | ContactError::InvalidEmail => StatusCode::BAD_REQUEST,
            ContactError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ContactError::Internal(_) => "Internal server error. Please try again later.".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        if let ContactError::Internal(detail) = &self {
            tracing::error!(error = %detail, "Contact form error");
        }
        (
            self.status(),
            Json(json!({ "success": false, "error": self.public_message() })),
        )
            .into_response()
    }
}

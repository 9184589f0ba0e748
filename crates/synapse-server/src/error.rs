use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the HTTP host, rendered in the `OpenAI` error format
#[derive(Debug, Error)]
pub enum FilterError {
    /// Request body is not what the endpoint expects
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request body exceeded the buffering limit
    #[error("Request body too large, limit is {0} bytes")]
    PayloadTooLarge(usize),

    /// Forwarding to the upstream text model failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal server error, details are logged but not returned
    #[error("Internal server error")]
    Internal,
}

impl FilterError {
    /// HTTP status code for this error
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error type
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) | Self::PayloadTooLarge(_) => "invalid_request_error",
            Self::Upstream(_) => "api_error",
            Self::Internal => "internal_error",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    r#type: &'static str,
    code: u16,
}

impl IntoResponse for FilterError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_response = ErrorResponse {
            error: ErrorDetails {
                message: self.to_string(),
                r#type: self.error_type(),
                code: status.as_u16(),
            },
        };

        (status, Json(error_response)).into_response()
    }
}

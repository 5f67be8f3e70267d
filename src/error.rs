use axum::{
    body::Body,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::error;

/// Every failure a request can surface, classified before it reaches the
/// HTTP boundary. `PartialFailure` means the primary effect of a multi-step
/// operation stood but a secondary cleanup or linkage step did not.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthenticated(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    PayloadTooLarge,
    PartialFailure(String),
    Unexpected(anyhow::Error),
}

fn format_error(e: &anyhow::Error) -> String {
    let mut s = String::new();
    s.push_str(&format!("{}", e));
    for cause in e.chain().skip(1) {
        s.push_str(&format!("\nCaused by: {}", cause));
    }
    s
}

fn error_body(message: &str) -> Body {
    Body::from(serde_json::json!({ "error": message }).to_string())
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Unauthenticated(message) => (StatusCode::UNAUTHORIZED, message),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::Conflict(message) => (StatusCode::CONFLICT, message),
            Self::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Uploaded image exceeds the 5 MiB limit".to_string(),
            ),
            Self::PartialFailure(message) => {
                error!(error = %message, "Partial failure");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            Self::Unexpected(err) => {
                error!(
                    error = %format_error(&err),
                    backtrace = ?err.backtrace(),
                    "Unexpected error"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unknown error occurred".to_string(),
                )
            }
        };

        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
            .body(error_body(&message))
            .unwrap_or_else(|err| {
                let err = err.into();
                error!(error = %format_error(&err), "Failed to build error response");
                (StatusCode::INTERNAL_SERVER_ERROR, Body::empty()).into_response()
            })
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Unexpected(err.into())
    }
}

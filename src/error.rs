// HTTP API Error Types
use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::manager::DatabaseError;
use crate::handlers::form::FormError;

/// HTTP API error with appropriate status codes and client-facing messages.
///
/// Every variant renders as `{"message": ..., "error": ...}`, with `error`
/// present only when there is detail worth handing back.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest { message: String, detail: Option<String> },

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError { message: String, detail: Option<String> },

    // 413 Payload Too Large
    PayloadTooLarge(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest { message, .. } => message,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError { message, .. } => message,
            ApiError::PayloadTooLarge(msg) => msg,
        }
    }

    fn detail(&self) -> Option<&str> {
        match self {
            ApiError::BadRequest { detail, .. } | ApiError::InternalServerError { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut body = json!({ "message": self.message() });
        if let Some(detail) = self.detail() {
            body["error"] = json!(detail);
        }
        body
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest { message: message.into(), detail: None }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError { message: message.into(), detail: None }
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    /// Attach detail to a 400 or 500; other variants are returned unchanged
    pub fn with_detail(self, detail: impl Into<String>) -> Self {
        match self {
            ApiError::BadRequest { message, .. } => ApiError::BadRequest { message, detail: Some(detail.into()) },
            ApiError::InternalServerError { message, .. } => {
                ApiError::InternalServerError { message, detail: Some(detail.into()) }
            }
            other => other,
        }
    }

    /// 500 carrying the driver's message, logged first
    pub fn database(message: impl Into<String>, err: DatabaseError) -> Self {
        let message = message.into();
        tracing::error!("{}: {}", message, err);
        ApiError::internal_server_error(message).with_detail(err.to_string())
    }

    /// 500 with the driver's message kept out of the response body
    pub fn database_opaque(message: impl Into<String>, err: DatabaseError) -> Self {
        let message = message.into();
        tracing::error!("{}: {}", message, err);
        ApiError::internal_server_error(message)
    }

    /// 400 for a form the service could not read, 413 when it hit the body limit
    pub fn form(message: impl Into<String>, err: FormError) -> Self {
        tracing::debug!("rejected form: {}", err);
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::payload_too_large("Request body too large");
        }
        ApiError::bad_request(message).with_detail(err.to_string())
    }

    /// JSON body axum refused to decode
    pub fn json_body(rejection: JsonRejection) -> Self {
        tracing::debug!("rejected json body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::payload_too_large("Request body too large");
        }
        ApiError::bad_request("Invalid request body").with_detail(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.detail() {
            Some(detail) => write!(f, "{}: {}", self.message(), detail),
            None => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Success body of the form `{"message": ..., <extra keys>...}`
#[derive(Debug)]
pub struct ApiMessage {
    pub message: String,
    pub fields: Map<String, Value>,
    serialization_error: Option<serde_json::Error>,
}

impl ApiMessage {
    /// Message with no extra keys
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fields: Map::new(),
            serialization_error: None,
        }
    }

    /// Add a key next to `message`
    pub fn with<T: Serialize>(mut self, key: &str, value: T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.fields.insert(key.to_string(), value);
            }
            Err(e) => self.serialization_error = Some(e),
        }
        self
    }

    pub fn to_json(&self) -> Value {
        let mut body = self.fields.clone();
        body.insert("message".to_string(), json!(self.message));
        Value::Object(body)
    }
}

impl IntoResponse for ApiMessage {
    fn into_response(self) -> Response {
        if let Some(e) = &self.serialization_error {
            tracing::error!("Failed to serialize response data: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Failed to serialize response data" })),
            )
                .into_response();
        }

        (StatusCode::OK, Json(self.to_json())).into_response()
    }
}

pub type ApiResult<T = ApiMessage> = Result<T, crate::error::ApiError>;

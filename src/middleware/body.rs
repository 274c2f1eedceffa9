// middleware/body.rs - lenient JSON request bodies
//
// Clients of this API send JSON bodies with missing or odd content types,
// and empty bodies. Those read as `{}`; only a JSON body that fails to
// decode is rejected, and always with the JSON error envelope.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// `Json<T>` that falls back to `T::default()` instead of rejecting
#[derive(Debug, Clone, Default)]
pub struct LooseJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for LooseJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let json = is_json(req.headers());
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::payload_too_large("Request body too large")
            } else {
                ApiError::bad_request("Invalid request body").with_detail(rejection.body_text())
            }
        })?;

        if !json || bytes.is_empty() {
            return Ok(LooseJson(T::default()));
        }

        let Json(value) = Json::<T>::from_bytes(&bytes).map_err(ApiError::json_body)?;
        Ok(LooseJson(value))
    }
}

/// Media type of the request without parameters, lowercased
pub fn media_type(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
    let essence = value.split(';').next().unwrap_or(value).trim();
    Some(essence.to_ascii_lowercase())
}

/// `application/json` or any `+json` suffix type
pub fn is_json(headers: &HeaderMap) -> bool {
    media_type(headers).is_some_and(|m| m == "application/json" || m.ends_with("+json"))
}

pub fn is_multipart(headers: &HeaderMap) -> bool {
    media_type(headers).is_some_and(|m| m == "multipart/form-data")
}

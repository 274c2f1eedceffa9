// handlers/images.rs - POST /upload and GET /image/:id

use axum::{
    extract::{Path, Request, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::database::models::NewImage;
use crate::error::ApiError;
use crate::handlers::form::FormData;
use crate::middleware::{ApiMessage, ApiResult};

const IMAGE_FIELD: &str = "image";
const FALLBACK_MIMETYPE: &str = "application/octet-stream";

/// POST /upload - multipart with a single `image` file part
pub async fn upload(State(state): State<AppState>, request: Request) -> ApiResult {
    let form = FormData::from_request(request, IMAGE_FIELD)
        .await
        .map_err(|e| ApiError::form("Error uploading image", e))?;

    let file = form.file.ok_or_else(|| ApiError::bad_request("No image uploaded"))?;
    let image = NewImage {
        name: file.file_name,
        data: file.bytes,
        mimetype: file.content_type,
    };

    let id = state
        .store
        .insert_image(&image)
        .await
        .map_err(|e| ApiError::database_opaque("Error uploading image", e))?;

    tracing::info!(id, bytes = image.data.len(), "stored image");
    Ok(ApiMessage::ok("Image uploaded").with("id", id))
}

/// GET /image/:id - raw bytes with the stored content type
pub async fn image_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let id: i32 = id
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid image id"))?;

    let image = state
        .store
        .find_image(id)
        .await
        .map_err(|e| ApiError::database_opaque("Error retrieving image", e))?
        .ok_or_else(|| ApiError::not_found("Image not found"))?;

    let mimetype = image.mimetype.unwrap_or_else(|| FALLBACK_MIMETYPE.to_string());
    Ok(([(header::CONTENT_TYPE, mimetype)], image.data).into_response())
}

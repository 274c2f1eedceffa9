// handlers/form.rs - form reading shared by the upload routes
//
// Multipart bodies carry the file; a JSON object is accepted in their place
// with the same field names and no file. Any other body reads as empty.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        rejection::{BytesRejection, JsonRejection},
        FromRequest, Request,
    },
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::middleware::body::{is_json, is_multipart};

#[derive(Debug, Error)]
pub enum FormError {
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("{}", .0.body_text())]
    MultipartRejection(#[from] MultipartRejection),

    #[error("{}", .0.body_text())]
    Body(#[from] BytesRejection),

    #[error("{}", .0.body_text())]
    Json(#[from] JsonRejection),

    #[error("invalid value for {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

impl FormError {
    pub fn status(&self) -> StatusCode {
        match self {
            FormError::Multipart(e) => e.status(),
            FormError::MultipartRejection(e) => e.status(),
            FormError::Body(e) => e.status(),
            FormError::Json(e) => e.status(),
            FormError::InvalidField { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

/// File part held in memory
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Decoded text fields plus at most one file
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl FormData {
    /// Read whatever body the request carries
    pub async fn from_request(req: Request, file_field: &str) -> Result<Self, FormError> {
        if is_multipart(req.headers()) {
            let multipart = Multipart::from_request(req, &()).await?;
            return Self::read(multipart, file_field).await;
        }
        if !is_json(req.headers()) {
            return Ok(FormData::default());
        }

        let bytes = Bytes::from_request(req, &()).await?;
        if bytes.is_empty() {
            return Ok(FormData::default());
        }
        let Json(object) = Json::<Map<String, Value>>::from_bytes(&bytes)?;
        Ok(Self::from_json(object))
    }

    /// Strings are kept as sent; numbers and booleans use their JSON text
    fn from_json(object: Map<String, Value>) -> Self {
        let fields = object
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect();
        FormData { fields, file: None }
    }

    /// Drain the multipart stream. The part named `file_field` is kept as
    /// bytes, every other part is read as text. Repeated names keep the last value.
    pub async fn read(mut multipart: Multipart, file_field: &str) -> Result<Self, FormError> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if name == file_field {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?.to_vec();
                form.file = Some(UploadedFile { file_name, content_type, bytes });
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        FormData {
            fields: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            file: None,
        }
    }

    /// Text value; empty strings count as absent
    pub fn text(&self, field: &str) -> Option<String> {
        self.fields
            .get(field)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }

    pub fn int(&self, field: &'static str) -> Result<Option<i32>, FormError> {
        self.parsed(field, |v| v.trim().parse::<i32>().ok())
    }

    /// ISO dates; a trailing time part (as sent by JS date pickers) is ignored
    pub fn date(&self, field: &'static str) -> Result<Option<NaiveDate>, FormError> {
        self.parsed(field, |v| {
            let v = v.trim();
            let day = v.split('T').next().unwrap_or(v);
            NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
        })
    }

    /// Only the literal text `true` is true
    pub fn flag(&self, field: &str) -> bool {
        self.fields.get(field).map(String::as_str) == Some("true")
    }

    fn parsed<T>(&self, field: &'static str, parse: impl Fn(&str) -> Option<T>) -> Result<Option<T>, FormError> {
        match self.text(field) {
            None => Ok(None),
            Some(value) => parse(&value)
                .map(Some)
                .ok_or(FormError::InvalidField { field, value }),
        }
    }
}

use std::sync::Arc;

use amrsense_api::app::{app, AppState};
use amrsense_api::config::{AppConfig, Instance};
use amrsense_api::database::{DatabaseManager, PgStore};
use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

// The service never creates these; a fresh test database needs them
const FIXTURE_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (id SERIAL PRIMARY KEY, email TEXT, mobile TEXT, otp TEXT)",
    "CREATE TABLE IF NOT EXISTS userdetails (
        personid SERIAL PRIMARY KEY,
        fullname TEXT, age INTEGER, mobile TEXT, dob DATE, gender TEXT, abhaid TEXT, userrole TEXT
    )",
    "CREATE TABLE IF NOT EXISTS images (id SERIAL PRIMARY KEY, name TEXT, data BYTEA, mimetype TEXT)",
];

const BOUNDARY: &str = "amrsense-it-boundary";

pub struct TestContext {
    pub router: Router,
    pub pool: PgPool,
}

impl TestContext {
    pub async fn send(&self, request: Request<Body>) -> Result<Response> {
        Ok(self.router.clone().oneshot(request).await?)
    }
}

/// Router over a real database, or `None` when DATABASE_URL is not set
pub async fn context(instance: Instance) -> Result<Option<TestContext>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database test");
        return Ok(None);
    };

    let mut config = AppConfig::development();
    config.server.instance = instance;
    config.database.url = url;
    config.api.enable_request_logging = false;

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to test database")?;
    for ddl in FIXTURE_TABLES {
        sqlx::query(ddl).execute(&pool).await?;
    }

    let store = PgStore::new(pool.clone(), &config.database);
    let router = app(AppState::new(Arc::new(store), instance), &config);
    Ok(Some(TestContext { router, pool }))
}

/// Suffix that keeps rows from separate runs apart
pub fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{prefix}-{nanos}")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_multipart(uri: &str, fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    if let Some((name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"upload.bin\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(res: Response) -> Result<Vec<u8>> {
    Ok(to_bytes(res.into_body(), usize::MAX).await?.to_vec())
}

pub async fn body_json(res: Response) -> Result<Value> {
    Ok(serde_json::from_slice(&body_bytes(res).await?)?)
}

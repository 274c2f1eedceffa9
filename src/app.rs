use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, Instance};
use crate::database::store::SubmissionStore;
use crate::handlers;
use crate::middleware::cors_layer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SubmissionStore>,
    pub instance: Instance,
}

impl AppState {
    pub fn new(store: Arc<dyn SubmissionStore>, instance: Instance) -> Self {
        Self { store, instance }
    }
}

/// Build the router for the configured instance
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(account_routes());

    if state.instance.serves_uploads() {
        router = router.merge(upload_routes());
    }

    let mut router = router
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state);

    // Global middleware
    if let Some(cors) = cors_layer(&config.security) {
        router = router.layer(cors);
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

fn account_routes() -> Router<AppState> {
    use handlers::users;

    Router::new()
        .route("/register", post(users::register))
        .route("/createAccount", post(users::create_account))
}

fn upload_routes() -> Router<AppState> {
    use handlers::{community, images};

    Router::new()
        // Standalone images
        .route("/upload", post(images::upload))
        .route("/image/:id", get(images::image_get))
        // Community worker submissions
        .route("/community/:id/upload", post(community::upload))
        .route("/getCommunityDetails", get(community::details))
}

//! Router assembly and shared application state.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    routing::{get, post},
    Router,
};
use openai_client::OpenAIClient;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::kernel::{ObjectStoreClient, PgDocumentStore};
use crate::server::routes;

/// Maximum accepted upload size for `/extract/upload`.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub openai_client: Option<Arc<OpenAIClient>>,
    pub object_store: Arc<ObjectStoreClient>,
    pub document_store: Arc<PgDocumentStore>,
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/extract", post(routes::extract::extract_handler))
        .route(
            "/extract/upload",
            post(routes::extract::extract_upload_handler),
        )
        .route("/health", get(routes::health::health_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}

use std::sync::Arc;

use anyhow::{Context, Result};
use openai_client::OpenAIClient;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use server_core::config::Config;
use server_core::kernel::{ObjectStoreClient, PgDocumentStore};
use server_core::server::app::{build_app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=info,pdf_pipeline=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;

    let object_store = ObjectStoreClient::new(&config.storage_url, &config.storage_service_key)
        .context("Failed to create object store client")?;
    let document_store = PgDocumentStore::new(db_pool.clone());

    let openai_client = match &config.openai_api_key {
        Some(key) => Some(Arc::new(OpenAIClient::new(key.clone()))),
        None => {
            warn!("OPENAI_API_KEY not set; extraction requests will be rejected");
            None
        }
    };

    let port = config.port;
    let state = AppState {
        db_pool,
        config: Arc::new(config),
        openai_client,
        object_store: Arc::new(object_store),
        document_store: Arc::new(document_store),
    };

    let app = build_app(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("server listening on {addr}");
    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

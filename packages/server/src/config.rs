use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Absent key is tolerated at boot; extraction requests answer with
    /// a configuration error until it is set.
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub storage_url: String,
    pub storage_service_key: String,
    pub max_chunk_size: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            storage_url: env::var("STORAGE_URL")
                .context("STORAGE_URL must be set")?,
            storage_service_key: env::var("STORAGE_SERVICE_KEY")
                .context("STORAGE_SERVICE_KEY must be set")?,
            max_chunk_size: env::var("MAX_CHUNK_SIZE")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .context("MAX_CHUNK_SIZE must be a valid number")?,
        })
    }
}

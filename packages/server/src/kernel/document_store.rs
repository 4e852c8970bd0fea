//! Postgres persistence for extracted document text.
//!
//! Implements the pipeline's [`TextSink`] seam. Writes are keyed by the
//! document's source path; the pipeline treats a failed write as a
//! warning, so errors here never surface to the API caller.

use async_trait::async_trait;
use pdf_pipeline::TextSink;
use sqlx::PgPool;

/// Record store for extracted text, keyed by file path.
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TextSink for PgDocumentStore {
    async fn store_text(
        &self,
        path: &str,
        text: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO documents (file_path, extracted_text, extracted_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (file_path)
            DO UPDATE SET extracted_text = EXCLUDED.extracted_text, extracted_at = NOW()
            "#,
        )
        .bind(path)
        .bind(text)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

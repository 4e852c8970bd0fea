//! Pipeline orchestration: bytes in, clean text out.
//!
//! Stages run strictly in sequence: download, scrape, normalize, chunk,
//! enhance (per chunk), reassemble, persist. Only download, scrape, and
//! the no-readable-text check can fail the run; a chunk that cannot be
//! enhanced falls back to its raw text, and a persistence failure is
//! logged without failing the run (the caller still gets the text).

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::chunker::chunk;
use crate::enhance::Enhancer;
use crate::error::{ExtractError, Result};
use crate::metrics::ProcessingMetrics;
use crate::normalize::{normalize, normalize_text};
use crate::scraper::{structured_extract, Scraper};

/// Pipeline stages, in execution order. Used for tracing and error
/// classification, never for control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Downloading,
    Scraping,
    Normalizing,
    Chunking,
    Enhancing,
    Reassembling,
    Persisting,
    Done,
}

/// Method tag recorded when the object-model parse produced the text.
pub const METHOD_PDF_PARSE: &str = "pdf-parse";
/// Method tag recorded when the heuristic scraper produced the text.
pub const METHOD_HEURISTIC: &str = "heuristic-scrape";

/// Fetches raw document bytes from an object store.
#[async_trait]
pub trait ByteSource: Send + Sync {
    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>>;
}

/// Persists extracted text into a record store keyed by source path.
///
/// Failures here are deliberately non-fatal to the pipeline.
#[async_trait]
pub trait TextSink: Send + Sync {
    async fn store_text(
        &self,
        path: &str,
        text: &str,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Tunable pipeline parameters.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum characters per chunk, sized below the enhancement model's
    /// context limit with room for the system prompt and output.
    pub max_chunk_size: usize,
    /// Try the PDF object-model parser before the heuristic scraper.
    pub structured_first: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 8000,
            structured_first: true,
        }
    }
}

/// The extraction outcome returned to the caller. Persistence is a side
/// effect; ownership of the text transfers to the caller here.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub content: String,
    pub file_size: usize,
    pub method: String,
    pub metrics: ProcessingMetrics,
}

/// Sequences scrape, normalize, chunk, enhance, and reassemble.
///
/// Generic over the enhancer to allow mocking in tests:
/// - Production: `Pipeline<OpenAiEnhancer>`
/// - Testing: `Pipeline<MockEnhancer>`
pub struct Pipeline<E: Enhancer> {
    scraper: Scraper,
    enhancer: E,
    config: PipelineConfig,
}

impl<E: Enhancer> Pipeline<E> {
    pub fn new(enhancer: E) -> Self {
        Self::with_config(enhancer, PipelineConfig::default())
    }

    pub fn with_config(enhancer: E, config: PipelineConfig) -> Self {
        Self {
            scraper: Scraper::default(),
            enhancer,
            config,
        }
    }

    /// Override the heuristic rule set.
    pub fn with_scraper(mut self, scraper: Scraper) -> Self {
        self.scraper = scraper;
        self
    }

    /// Run the pipeline over already-downloaded bytes.
    pub async fn run(&self, bytes: &[u8]) -> Result<ExtractionResult> {
        let mut metrics = ProcessingMetrics::start();
        metrics.file_size_bytes = bytes.len();

        debug!(stage = ?Stage::Scraping, byte_len = bytes.len(), "extracting text");
        let (text, method) = self.extract_text(bytes).ok_or_else(|| {
            info!(stage = ?Stage::Normalizing, "document yielded no readable text");
            ExtractError::NoReadableText
        })?;

        debug!(stage = ?Stage::Chunking, text_len = text.len(), "chunking normalized text");
        let chunks = chunk(&text, self.config.max_chunk_size);

        let total = chunks.len();
        let mut enhanced_parts = Vec::with_capacity(total);
        for (i, part) in chunks.iter().enumerate() {
            debug!(stage = ?Stage::Enhancing, chunk = i + 1, total, "enhancing chunk");
            match self.enhancer.enhance(part).await {
                Ok(enhanced) => {
                    metrics.record_enhancement(enhanced.tokens_used, enhanced.retries);
                    enhanced_parts.push(enhanced.text);
                }
                Err(e) => {
                    // Partial degradation beats total failure: keep the
                    // unenhanced chunk so no content is lost.
                    warn!(
                        chunk = i + 1,
                        total,
                        error = %e,
                        "enhancement failed for chunk, falling back to raw text"
                    );
                    metrics.record_enhancement(0, 0);
                    enhanced_parts.push(part.clone());
                }
            }
        }

        debug!(stage = ?Stage::Reassembling, chunks = total, "reassembling chunks");
        let content = enhanced_parts.join("\n\n");

        metrics.finish_ok(method);
        debug!(stage = ?Stage::Done, method, "extraction complete");

        Ok(ExtractionResult {
            content,
            file_size: bytes.len(),
            method: method.to_string(),
            metrics,
        })
    }

    /// Download, extract, and persist. Persistence failure is logged but
    /// never fails the operation.
    pub async fn extract_and_store(
        &self,
        source: &dyn ByteSource,
        sink: Option<&dyn TextSink>,
        bucket: &str,
        path: &str,
    ) -> Result<ExtractionResult> {
        debug!(stage = ?Stage::Downloading, bucket, path, "downloading source bytes");
        let bytes = source.download(bucket, path).await?;

        let result = self.run(&bytes).await?;

        if let Some(sink) = sink {
            debug!(stage = ?Stage::Persisting, path, "persisting extracted text");
            if let Err(e) = sink.store_text(path, &result.content).await {
                warn!(
                    error = %e,
                    path,
                    "failed to persist extracted text; returning content anyway"
                );
            }
        }

        Ok(result)
    }

    /// Structured parse first, heuristic scrape as fallback. Returns the
    /// normalized text and the method tag that produced it.
    fn extract_text(&self, bytes: &[u8]) -> Option<(String, &'static str)> {
        if self.config.structured_first {
            if let Some(parsed) = structured_extract(bytes) {
                if let Some(text) = normalize_text(&parsed) {
                    return Some((text, METHOD_PDF_PARSE));
                }
                debug!("structured parse produced no readable text");
            }
            info!("structured parse unusable, falling back to heuristic scraper");
        }

        let fragments = self.scraper.scrape(bytes);
        normalize(&fragments).map(|text| (text, METHOD_HEURISTIC))
    }
}

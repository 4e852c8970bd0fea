//! Best-Effort PDF Text Extraction Pipeline
//!
//! Pulls readable text out of raw PDF byte streams, cleans it, splits it
//! into model-sized chunks, enhances each chunk through a chat-completion
//! endpoint, and reassembles the result.
//!
//! # Design Philosophy
//!
//! **Degrade gracefully, never lose content.**
//!
//! - A structured object-model parse is tried first; a heuristic byte
//!   scraper takes over when it fails
//! - A chunk that cannot be enhanced keeps its raw text
//! - A persistence failure still returns the extracted text to the caller
//! - The only fatal outcomes: source bytes unavailable, no readable text,
//!   missing credentials
//!
//! # Usage
//!
//! ```rust,ignore
//! use pdf_pipeline::{OpenAiEnhancer, Pipeline, PipelineConfig};
//! use openai_client::OpenAIClient;
//!
//! let enhancer = OpenAiEnhancer::new(OpenAIClient::from_env()?, "gpt-4o-mini");
//! let pipeline = Pipeline::new(enhancer);
//!
//! let result = pipeline.extract_and_store(&store, Some(&sink), "uploads", "report.pdf").await?;
//! println!("{} ({} tokens)", result.content, result.metrics.tokens_used);
//! ```
//!
//! # Modules
//!
//! - [`scraper`] - structured and heuristic text recovery from raw bytes
//! - [`normalize`] - artifact cleanup and the unreadable-document check
//! - [`chunker`] - sentence-boundary splitting under a character budget
//! - [`enhance`] - LLM enhancement with retry/backoff
//! - [`pipeline`] - stage orchestration and collaborator traits
//! - [`metrics`] - per-run observability counters
//! - [`testing`] - mock implementations for tests

pub mod chunker;
pub mod enhance;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod scraper;
pub mod testing;

pub use chunker::chunk;
pub use enhance::{
    retry_with_policy, Enhanced, Enhancer, OpenAiEnhancer, RetryPolicy, ENHANCEMENT_SYSTEM_PROMPT,
};
pub use error::{EnhanceError, ErrorCategory, ExtractError, Result};
pub use metrics::ProcessingMetrics;
pub use normalize::{normalize, normalize_text};
pub use pipeline::{
    ByteSource, ExtractionResult, Pipeline, PipelineConfig, Stage, TextSink, METHOD_HEURISTIC,
    METHOD_PDF_PARSE,
};
pub use scraper::{structured_extract, Fragment, ScrapeRule, Scraper};
pub use testing::{MockEnhancer, MockOutcome, MockSink, MockSource};

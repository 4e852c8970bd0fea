//! LLM enhancement of extracted text chunks.
//!
//! Each chunk goes to a chat-completion endpoint with a fixed system
//! instruction; transient failures are retried with exponential backoff
//! and jitter. The [`Enhancer`] trait is the seam for mocking in tests
//! (see [`crate::testing::MockEnhancer`]).

use std::time::Duration;

use async_trait::async_trait;
use openai_client::{strip_code_blocks, ChatRequest, Message, OpenAIClient};
use tokio::time::sleep;
use tracing::{error, warn};

use crate::error::EnhanceError;

/// Fixed instruction for the enhancement pass. The model must not add
/// commentary; the output replaces the chunk verbatim.
pub const ENHANCEMENT_SYSTEM_PROMPT: &str = "You clean up text extracted from PDF documents. \
Fix broken words, spacing, and punctuation, restore paragraph structure, and remove \
extraction artifacts. Return only the cleaned text with no commentary, headers, or notes.";

const MAX_RETRIES: u32 = 3;
const BASE_DELAY_MS: u64 = 1000;
const MAX_JITTER_MS: u64 = 250;
const DEFAULT_COMPLETION_BUDGET: u32 = 4096;

/// A successfully enhanced chunk with its accounting.
#[derive(Debug, Clone)]
pub struct Enhanced {
    pub text: String,
    pub tokens_used: u32,
    pub retries: u32,
}

/// Cleans one chunk of extracted text.
#[async_trait]
pub trait Enhancer: Send + Sync {
    async fn enhance(&self, chunk: &str) -> Result<Enhanced, EnhanceError>;
}

/// Exponential backoff with jitter: 1s, 2s, 4s (plus up to 250ms noise).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay: Duration::from_millis(BASE_DELAY_MS),
            max_jitter: Duration::from_millis(MAX_JITTER_MS),
        }
    }
}

impl RetryPolicy {
    /// Delay before the `retry`-th retry (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        let backoff = self.base_delay * 2u32.pow(exponent);
        let jitter = Duration::from_millis(fastrand::u64(0..=self.max_jitter.as_millis() as u64));
        backoff + jitter
    }
}

/// Production enhancer backed by the OpenAI chat completions API.
pub struct OpenAiEnhancer {
    client: OpenAIClient,
    model: String,
    policy: RetryPolicy,
    completion_budget: u32,
}

impl OpenAiEnhancer {
    pub fn new(client: OpenAIClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            policy: RetryPolicy::default(),
            completion_budget: DEFAULT_COMPLETION_BUDGET,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_completion_budget(mut self, budget: u32) -> Self {
        self.completion_budget = budget;
        self
    }

    fn request_for(&self, chunk: &str) -> ChatRequest {
        ChatRequest::new(&self.model)
            .message(Message::system(ENHANCEMENT_SYSTEM_PROMPT))
            .message(Message::user(chunk))
            .temperature(0.0)
            .completion_budget(self.completion_budget)
    }
}

/// Run `op` under the retry policy. Returns the value and the number of
/// retries consumed (0 when the first attempt succeeds).
///
/// Rate limits, upstream failures, and network failures all retry under
/// the same policy; the last error propagates once the budget is spent.
pub async fn retry_with_policy<T, F, Fut>(
    policy: &RetryPolicy,
    mut op: F,
) -> Result<(T, u32), EnhanceError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, EnhanceError>>,
{
    let mut retries = 0u32;

    loop {
        match op().await {
            Ok(value) => return Ok((value, retries)),
            Err(e) if retries < policy.max_retries => {
                retries += 1;
                let delay = policy.delay_for(retries);
                warn!(
                    error = %e,
                    retry = retries,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "Chunk enhancement failed, retrying..."
                );
                sleep(delay).await;
            }
            Err(e) => {
                error!(error = %e, "Chunk enhancement failed after all retries");
                return Err(e);
            }
        }
    }
}

#[async_trait]
impl Enhancer for OpenAiEnhancer {
    async fn enhance(&self, chunk: &str) -> Result<Enhanced, EnhanceError> {
        let (response, retries) = retry_with_policy(&self.policy, || async move {
            self.client
                .chat_completion(self.request_for(chunk))
                .await
                .map_err(EnhanceError::from)
        })
        .await?;

        let text = strip_code_blocks(&response.content).to_string();
        let tokens_used = response.usage.map(|u| u.total_tokens).unwrap_or(0);
        Ok(Enhanced {
            text,
            tokens_used,
            retries,
        })
    }
}

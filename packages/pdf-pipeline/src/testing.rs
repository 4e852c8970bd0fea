//! Mock implementations for testing pipeline behavior without network
//! or database access.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::enhance::{Enhanced, Enhancer};
use crate::error::{EnhanceError, ExtractError, Result};
use crate::pipeline::{ByteSource, TextSink};

/// Scripted outcome for one [`MockEnhancer`] call.
pub enum MockOutcome {
    Success {
        text: String,
        tokens: u32,
        retries: u32,
    },
    Failure(EnhanceError),
}

/// Enhancer that replays scripted outcomes, then echoes chunks back.
///
/// The default (no script) echoes every chunk with a fixed token count,
/// which lets content-preservation assertions compare input to output.
pub struct MockEnhancer {
    outcomes: Mutex<VecDeque<MockOutcome>>,
    calls: Mutex<Vec<String>>,
}

impl MockEnhancer {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue an outcome for the next un-scripted call.
    pub fn push_outcome(&self, outcome: MockOutcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    /// Queue a success that marks the chunk as enhanced.
    pub fn push_success(&self, text: impl Into<String>, tokens: u32, retries: u32) {
        self.push_outcome(MockOutcome::Success {
            text: text.into(),
            tokens,
            retries,
        });
    }

    /// Queue a terminal failure (retries already exhausted).
    pub fn push_failure(&self, error: EnhanceError) {
        self.push_outcome(MockOutcome::Failure(error));
    }

    /// Chunks received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockEnhancer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Enhancer for MockEnhancer {
    async fn enhance(&self, chunk: &str) -> std::result::Result<Enhanced, EnhanceError> {
        self.calls.lock().unwrap().push(chunk.to_string());

        match self.outcomes.lock().unwrap().pop_front() {
            Some(MockOutcome::Success {
                text,
                tokens,
                retries,
            }) => Ok(Enhanced {
                text,
                tokens_used: tokens,
                retries,
            }),
            Some(MockOutcome::Failure(error)) => Err(error),
            None => Ok(Enhanced {
                text: chunk.to_string(),
                tokens_used: 10,
                retries: 0,
            }),
        }
    }
}

/// Byte source serving a fixed buffer, or failing on demand.
pub struct MockSource {
    bytes: Option<Vec<u8>>,
}

impl MockSource {
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Some(bytes.into()),
        }
    }

    /// A source whose download always fails with a storage error.
    pub fn unavailable() -> Self {
        Self { bytes: None }
    }
}

#[async_trait]
impl ByteSource for MockSource {
    async fn download(&self, _bucket: &str, path: &str) -> Result<Vec<u8>> {
        match &self.bytes {
            Some(bytes) => Ok(bytes.clone()),
            None => Err(ExtractError::storage(format!("object not found: {path}"))),
        }
    }
}

/// Sink that records writes, or fails on demand.
pub struct MockSink {
    writes: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A sink whose writes always fail.
    pub fn failing() -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Recorded `(path, text)` writes.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().unwrap().clone()
    }
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextSink for MockSink {
    async fn store_text(
        &self,
        path: &str,
        text: &str,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.fail {
            return Err("record store write rejected".into());
        }
        self.writes
            .lock()
            .unwrap()
            .push((path.to_string(), text.to_string()));
        Ok(())
    }
}

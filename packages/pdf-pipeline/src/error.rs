//! Typed errors for the extraction pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Every fatal pipeline error
//! maps to exactly one [`ErrorCategory`], which callers translate into a
//! user-facing message and HTTP status.

use thiserror::Error;

/// Errors that abort a pipeline run.
///
/// Per-chunk enhancement failures are NOT represented here: they are
/// recovered locally by falling back to the unenhanced chunk text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Missing or invalid credentials for a collaborator service
    #[error("configuration error: {0}")]
    Config(String),

    /// Source bytes could not be fetched from the object store
    #[error("source unavailable: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Scraping and normalization produced no usable text
    #[error("no readable text in document")]
    NoReadableText,

    /// Upstream throttling exhausted the retry budget pipeline-wide
    #[error("rate limited by enhancement provider")]
    RateLimited,
}

impl ExtractError {
    /// Build a storage error from a plain message.
    pub fn storage(msg: impl Into<String>) -> Self {
        let msg: String = msg.into();
        Self::Storage(msg.into())
    }

    /// The machine-readable category for this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Storage(_) => ErrorCategory::Storage,
            Self::NoReadableText => ErrorCategory::Processing,
            Self::RateLimited => ErrorCategory::RateLimited,
        }
    }
}

/// Machine-readable failure categories surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing credentials; not retryable by the caller
    Configuration,
    /// Source bytes unavailable
    Storage,
    /// Document yielded no readable text
    Processing,
    /// Upstream throttling
    RateLimited,
}

impl ErrorCategory {
    /// Stable wire identifier for the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "ConfigurationError",
            Self::Storage => "StorageError",
            Self::Processing => "ProcessingError",
            Self::RateLimited => "RateLimited",
        }
    }
}

/// Per-chunk enhancement failures.
///
/// All three kinds are retried under the same backoff policy; only after
/// the retry budget is exhausted does the error reach the orchestrator,
/// which substitutes the original chunk text instead of failing the run.
#[derive(Debug, Error)]
pub enum EnhanceError {
    /// HTTP 429-equivalent from the completion endpoint
    #[error("rate limited by completion endpoint")]
    RateLimited,

    /// Any other upstream failure (non-2xx, malformed response)
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Transport failure (connection refused, timeout)
    #[error("network error: {0}")]
    Network(String),
}

impl From<openai_client::OpenAIError> for EnhanceError {
    fn from(err: openai_client::OpenAIError) -> Self {
        use openai_client::OpenAIError;
        match err {
            OpenAIError::RateLimited { .. } => Self::RateLimited,
            OpenAIError::Network(msg) => Self::Network(msg),
            OpenAIError::Api { status, message } => {
                Self::Upstream(format!("HTTP {}: {}", status, message))
            }
            OpenAIError::Parse(msg) | OpenAIError::Config(msg) => Self::Upstream(msg),
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            ExtractError::Config("no key".into()).category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            ExtractError::storage("404").category(),
            ErrorCategory::Storage
        );
        assert_eq!(
            ExtractError::NoReadableText.category(),
            ErrorCategory::Processing
        );
        assert_eq!(
            ExtractError::RateLimited.category(),
            ErrorCategory::RateLimited
        );
    }

    #[test]
    fn test_category_wire_names() {
        assert_eq!(ErrorCategory::Configuration.as_str(), "ConfigurationError");
        assert_eq!(ErrorCategory::Storage.as_str(), "StorageError");
        assert_eq!(ErrorCategory::Processing.as_str(), "ProcessingError");
        assert_eq!(ErrorCategory::RateLimited.as_str(), "RateLimited");
    }

    #[test]
    fn test_enhance_error_from_openai() {
        let rate = EnhanceError::from(openai_client::OpenAIError::RateLimited {
            message: "slow down".into(),
            retry_after: None,
        });
        assert!(matches!(rate, EnhanceError::RateLimited));

        let api = EnhanceError::from(openai_client::OpenAIError::Api {
            status: 500,
            message: "oops".into(),
        });
        assert!(matches!(api, EnhanceError::Upstream(_)));

        let net = EnhanceError::from(openai_client::OpenAIError::Network("refused".into()));
        assert!(matches!(net, EnhanceError::Network(_)));
    }
}

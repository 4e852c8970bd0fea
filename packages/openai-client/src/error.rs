//! Error types for OpenAI client.

use thiserror::Error;

/// Result type for OpenAI client operations.
pub type Result<T> = std::result::Result<T, OpenAIError>;

/// OpenAI client errors.
///
/// Rate limiting is a distinct variant (not folded into `Api`) because
/// callers apply different retry/backoff treatment to HTTP 429 than to
/// other upstream failures.
#[derive(Debug, Error)]
pub enum OpenAIError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream throttling (HTTP 429)
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        /// Seconds suggested by the `Retry-After` header, when present
        retry_after: Option<u64>,
    },

    /// API error (non-2xx response other than 429)
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl OpenAIError {
    /// Whether a retry of the same request may succeed.
    ///
    /// Rate limits and server-side failures are transient; configuration
    /// and parse errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Network(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Config(_) | Self::Parse(_) => false,
        }
    }

    /// Whether this error is an upstream throttle (HTTP 429).
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let rate_limited = OpenAIError::RateLimited {
            message: "slow down".into(),
            retry_after: Some(2),
        };
        assert!(rate_limited.is_retryable());
        assert!(rate_limited.is_rate_limit());

        let server_err = OpenAIError::Api {
            status: 503,
            message: "overloaded".into(),
        };
        assert!(server_err.is_retryable());
        assert!(!server_err.is_rate_limit());

        let bad_request = OpenAIError::Api {
            status: 400,
            message: "invalid model".into(),
        };
        assert!(!bad_request.is_retryable());

        assert!(OpenAIError::Network("timeout".into()).is_retryable());
        assert!(!OpenAIError::Config("no key".into()).is_retryable());
        assert!(!OpenAIError::Parse("bad json".into()).is_retryable());
    }
}

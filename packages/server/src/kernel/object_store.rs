//! Object store download client.
//!
//! Fetches raw document bytes over the store's HTTP API, addressed by
//! bucket and path. Implements the pipeline's [`ByteSource`] seam.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use pdf_pipeline::{ByteSource, ExtractError};
use tracing::debug;

/// HTTP client for the hosted object store.
pub struct ObjectStoreClient {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl ObjectStoreClient {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        })
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/object/{}/{}", self.base_url, bucket, path)
    }
}

#[async_trait]
impl ByteSource for ObjectStoreClient {
    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, ExtractError> {
        let url = self.object_url(bucket, path);
        debug!(url = %url, "downloading object");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| ExtractError::Storage(Box::new(e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ExtractError::storage(format!(
                "object not found: {bucket}/{path}"
            )));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ExtractError::RateLimited);
        }
        if !status.is_success() {
            return Err(ExtractError::storage(format!(
                "object store returned HTTP {status} for {bucket}/{path}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ExtractError::Storage(Box::new(e)))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_joins_without_double_slash() {
        let client = ObjectStoreClient::new("https://store.example.com/", "key").unwrap();
        assert_eq!(
            client.object_url("uploads", "reports/q3.pdf"),
            "https://store.example.com/object/uploads/reports/q3.pdf"
        );
    }
}

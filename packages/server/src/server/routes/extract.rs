//! Extraction endpoints.
//!
//! Both routes run the same pipeline; `/extract` pulls source bytes from
//! the object store and persists the result, `/extract/upload` accepts
//! the bytes directly and skips persistence (there is no record-store
//! path to key on). Failures always come back as structured JSON with a
//! machine category; raw errors never reach the caller.

use axum::{
    extract::{Extension, Multipart},
    http::StatusCode,
    Json,
};
use pdf_pipeline::{
    ErrorCategory, ExtractionResult, OpenAiEnhancer, Pipeline, PipelineConfig, ProcessingMetrics,
    TextSink,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::server::app::AppState;

/// Extraction request addressing source bytes in the object store.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    pub file_path: String,
    pub bucket: String,
}

/// Observability counters included in every response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsBody {
    pub processing_time_ms: i64,
    pub tokens_used: u32,
    pub chunks_processed: usize,
    #[serde(rename = "fileSizeMB")]
    pub file_size_mb: f64,
}

impl From<&ProcessingMetrics> for MetricsBody {
    fn from(metrics: &ProcessingMetrics) -> Self {
        Self {
            processing_time_ms: metrics.processing_time_ms(),
            tokens_used: metrics.tokens_used,
            chunks_processed: metrics.chunks_processed,
            file_size_mb: metrics.file_size_mb(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessBody {
    pub success: bool,
    pub content: String,
    pub file_size: usize,
    pub extraction_method: String,
    pub processing_metrics: MetricsBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureBody {
    pub success: bool,
    pub error: String,
    pub error_type: String,
    pub processing_metrics: MetricsBody,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ExtractResponse {
    Success(SuccessBody),
    Failure(FailureBody),
}

/// Extract text from a document stored in the object store.
pub async fn extract_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<ExtractRequest>,
) -> (StatusCode, Json<ExtractResponse>) {
    let mut metrics = ProcessingMetrics::start();
    info!(
        bucket = %request.bucket,
        path = %request.file_path,
        "extraction requested"
    );

    let Some(pipeline) = build_pipeline(&state) else {
        metrics.finish_err(ErrorCategory::Configuration);
        return failure_response(ErrorCategory::Configuration, &metrics);
    };

    let sink = state.document_store.as_ref() as &dyn TextSink;
    match pipeline
        .extract_and_store(
            state.object_store.as_ref(),
            Some(sink),
            &request.bucket,
            &request.file_path,
        )
        .await
    {
        Ok(result) => success_response(&result),
        Err(e) => {
            let category = e.category();
            error!(
                error = %e,
                error_type = category.as_str(),
                path = %request.file_path,
                "extraction failed"
            );
            metrics.finish_err(category);
            failure_response(category, &metrics)
        }
    }
}

/// Extract text from directly uploaded document bytes.
pub async fn extract_upload_handler(
    Extension(state): Extension<AppState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<ExtractResponse>) {
    let mut metrics = ProcessingMetrics::start();

    let mut file_name = "upload.pdf".to_string();
    let mut bytes: Option<Vec<u8>> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                if let Some(name) = field.file_name() {
                    file_name = name.to_string();
                }
                match field.bytes().await {
                    Ok(data) => bytes = Some(data.to_vec()),
                    Err(e) => {
                        error!(error = %e, "failed to read uploaded file");
                        metrics.finish_err(ErrorCategory::Storage);
                        return internal_error_response(&metrics);
                    }
                }
                break;
            }
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "malformed multipart upload");
                metrics.finish_err(ErrorCategory::Storage);
                return internal_error_response(&metrics);
            }
        }
    }

    let Some(bytes) = bytes else {
        metrics.finish_err(ErrorCategory::Processing);
        return failure_response(ErrorCategory::Processing, &metrics);
    };

    info!(file_name = %file_name, byte_len = bytes.len(), "upload extraction requested");

    let Some(pipeline) = build_pipeline(&state) else {
        metrics.finish_err(ErrorCategory::Configuration);
        return failure_response(ErrorCategory::Configuration, &metrics);
    };

    match pipeline.run(&bytes).await {
        Ok(result) => success_response(&result),
        Err(e) => {
            let category = e.category();
            error!(
                error = %e,
                error_type = category.as_str(),
                file_name = %file_name,
                "upload extraction failed"
            );
            metrics.finish_err(category);
            failure_response(category, &metrics)
        }
    }
}

fn build_pipeline(state: &AppState) -> Option<Pipeline<OpenAiEnhancer>> {
    let client = state.openai_client.as_ref()?;
    let enhancer = OpenAiEnhancer::new((**client).clone(), state.config.openai_model.clone());
    let config = PipelineConfig {
        max_chunk_size: state.config.max_chunk_size,
        ..PipelineConfig::default()
    };
    Some(Pipeline::with_config(enhancer, config))
}

fn success_response(result: &ExtractionResult) -> (StatusCode, Json<ExtractResponse>) {
    (
        StatusCode::OK,
        Json(ExtractResponse::Success(SuccessBody {
            success: true,
            content: result.content.clone(),
            file_size: result.file_size,
            extraction_method: result.method.clone(),
            processing_metrics: MetricsBody::from(&result.metrics),
        })),
    )
}

fn failure_response(
    category: ErrorCategory,
    metrics: &ProcessingMetrics,
) -> (StatusCode, Json<ExtractResponse>) {
    (
        status_for(category),
        Json(ExtractResponse::Failure(FailureBody {
            success: false,
            error: user_message(category).to_string(),
            error_type: category.as_str().to_string(),
            processing_metrics: MetricsBody::from(metrics),
        })),
    )
}

fn internal_error_response(metrics: &ProcessingMetrics) -> (StatusCode, Json<ExtractResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ExtractResponse::Failure(FailureBody {
            success: false,
            error: "The upload could not be read.".to_string(),
            error_type: "InternalError".to_string(),
            processing_metrics: MetricsBody::from(metrics),
        })),
    )
}

fn status_for(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::Configuration => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCategory::Storage => StatusCode::NOT_FOUND,
        ErrorCategory::Processing => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCategory::RateLimited => StatusCode::TOO_MANY_REQUESTS,
    }
}

fn user_message(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::Configuration => {
            "Text enhancement is not configured. Please try again later."
        }
        ErrorCategory::Storage => "The source document could not be found.",
        ErrorCategory::Processing => "No readable text could be extracted from this document.",
        ErrorCategory::RateLimited => "The enhancement service is busy. Please try again shortly.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserializes_camel_case() {
        let request: ExtractRequest =
            serde_json::from_str(r#"{"filePath": "reports/q3.pdf", "bucket": "uploads"}"#)
                .unwrap();
        assert_eq!(request.file_path, "reports/q3.pdf");
        assert_eq!(request.bucket, "uploads");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(ErrorCategory::Configuration),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status_for(ErrorCategory::Storage), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(ErrorCategory::Processing),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(ErrorCategory::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_failure_body_wire_shape() {
        let mut metrics = ProcessingMetrics::start();
        metrics.finish_err(ErrorCategory::Processing);

        let (status, Json(body)) = failure_response(ErrorCategory::Processing, &metrics);
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errorType"], "ProcessingError");
        assert!(json["error"].as_str().unwrap().contains("readable text"));
        assert!(json["processingMetrics"]["processingTimeMs"].is_number());
        assert!(json["processingMetrics"]["fileSizeMB"].is_number());
    }

    #[test]
    fn test_success_body_wire_shape() {
        let mut metrics = ProcessingMetrics::start();
        metrics.file_size_bytes = 1024;
        metrics.record_enhancement(150, 1);
        metrics.finish_ok("heuristic-scrape");

        let result = ExtractionResult {
            content: "Hello World".to_string(),
            file_size: 1024,
            method: "heuristic-scrape".to_string(),
            metrics,
        };

        let (status, Json(body)) = success_response(&result);
        assert_eq!(status, StatusCode::OK);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["content"], "Hello World");
        assert_eq!(json["fileSize"], 1024);
        assert_eq!(json["extractionMethod"], "heuristic-scrape");
        assert_eq!(json["processingMetrics"]["tokensUsed"], 150);
        assert_eq!(json["processingMetrics"]["chunksProcessed"], 1);
    }
}

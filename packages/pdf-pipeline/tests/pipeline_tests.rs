//! End-to-end pipeline tests against mock collaborators.
//!
//! These exercise the orchestration seams: structured-vs-heuristic path
//! selection, per-chunk enhancement fallback, metrics accounting, and
//! the persistence-is-not-fatal rule.

use pdf_pipeline::{
    EnhanceError, ErrorCategory, ExtractError, MockEnhancer, MockSink, MockSource, Pipeline,
    PipelineConfig, METHOD_HEURISTIC,
};

fn heuristic_config() -> PipelineConfig {
    PipelineConfig {
        structured_first: false,
        ..PipelineConfig::default()
    }
}

fn heuristic_pipeline(enhancer: MockEnhancer) -> Pipeline<MockEnhancer> {
    Pipeline::with_config(enhancer, heuristic_config())
}

#[tokio::test]
async fn test_show_text_operator_flows_through_to_result() {
    // Scenario: a single `(Hello World) Tj` operator in the byte stream
    let pipeline = heuristic_pipeline(MockEnhancer::new());

    let result = pipeline.run(b"%PDF-1.4 (Hello World) Tj trailer").await.unwrap();

    assert!(result.content.contains("Hello World"));
    assert_eq!(result.method, METHOD_HEURISTIC);
    assert_eq!(result.metrics.chunks_processed, 1);
    assert!(result.metrics.success);
    assert_eq!(result.file_size, b"%PDF-1.4 (Hello World) Tj trailer".len());
}

#[tokio::test]
async fn test_unreadable_bytes_fail_with_processing_category() {
    // No recognizable pattern anywhere in the input
    let pipeline = heuristic_pipeline(MockEnhancer::new());
    let garbage: Vec<u8> = (0..2048u32).map(|i| (i % 251) as u8).collect();

    let err = pipeline.run(&garbage).await.unwrap_err();

    assert!(matches!(err, ExtractError::NoReadableText));
    assert_eq!(err.category(), ErrorCategory::Processing);
}

#[tokio::test]
async fn test_enhanced_text_and_retry_count_are_recorded() {
    // The enhancer needed 3 retries before succeeding; the enhanced text
    // wins over the raw chunk and the retries land in metrics.
    let enhancer = MockEnhancer::new();
    enhancer.push_success("Cleaned and structured output text.", 200, 3);
    let pipeline = heuristic_pipeline(enhancer);

    let result = pipeline
        .run(b"(Quarterly earnings were strong this year) Tj")
        .await
        .unwrap();

    assert_eq!(result.content, "Cleaned and structured output text.");
    assert_eq!(result.metrics.retry_count, 3);
    assert_eq!(result.metrics.tokens_used, 200);
    assert_eq!(result.metrics.chunks_processed, 1);
}

#[tokio::test]
async fn test_failed_chunk_falls_back_to_raw_text() {
    // Two chunks; the first exhausts its retries. Its raw text must
    // survive into the reassembled result: no silent data loss.
    let enhancer = MockEnhancer::new();
    enhancer.push_failure(EnhanceError::RateLimited);
    enhancer.push_success("polished second part", 50, 0);

    let config = PipelineConfig {
        structured_first: false,
        max_chunk_size: 60,
    };
    let pipeline = Pipeline::with_config(enhancer, config);

    let bytes = b"(the first sentence talks about revenue growth. the second sentence covers operating margins) Tj";
    let result = pipeline.run(bytes).await.unwrap();

    assert!(result.content.contains("revenue growth"));
    assert!(result.content.contains("polished second part"));
    assert_eq!(result.metrics.chunks_processed, 2);
    assert_eq!(result.metrics.tokens_used, 50);
}

#[tokio::test]
async fn test_sink_failure_does_not_fail_the_run() {
    // Scenario: persistence write fails after successful enhancement.
    let pipeline = heuristic_pipeline(MockEnhancer::new());
    let source = MockSource::with_bytes(&b"(Annual compliance report contents) Tj"[..]);
    let sink = MockSink::failing();

    let result = pipeline
        .extract_and_store(&source, Some(&sink), "uploads", "reports/annual.pdf")
        .await
        .unwrap();

    assert!(result.content.contains("Annual compliance report"));
    assert!(result.metrics.success);
    assert!(sink.writes().is_empty());
}

#[tokio::test]
async fn test_successful_run_persists_keyed_by_path() {
    let pipeline = heuristic_pipeline(MockEnhancer::new());
    let source = MockSource::with_bytes(&b"(Executive summary of the merger) Tj"[..]);
    let sink = MockSink::new();

    let result = pipeline
        .extract_and_store(&source, Some(&sink), "uploads", "deals/merger.pdf")
        .await
        .unwrap();

    let writes = sink.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, "deals/merger.pdf");
    assert_eq!(writes[0].1, result.content);
}

#[tokio::test]
async fn test_missing_source_maps_to_storage_category() {
    let pipeline = heuristic_pipeline(MockEnhancer::new());
    let source = MockSource::unavailable();

    let err = pipeline
        .extract_and_store(&source, None, "uploads", "missing.pdf")
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::Storage(_)));
    assert_eq!(err.category(), ErrorCategory::Storage);
}

#[tokio::test]
async fn test_structured_parse_falls_back_to_heuristics_on_non_pdf() {
    // Not a valid PDF object graph, but heuristically readable: the
    // structured path must give way and tag the heuristic method.
    let pipeline = Pipeline::new(MockEnhancer::new());

    let result = pipeline
        .run(b"[ (Board) -200 (resolution) ] TJ (approved unanimously) Tj")
        .await
        .unwrap();

    assert_eq!(result.method, METHOD_HEURISTIC);
    assert!(result.content.contains("Board"));
    assert!(result.content.contains("approved unanimously"));
}

#[tokio::test]
async fn test_chunks_are_enhanced_in_order() {
    let enhancer = MockEnhancer::new();
    let config = PipelineConfig {
        structured_first: false,
        max_chunk_size: 60,
    };
    let pipeline = Pipeline::with_config(enhancer, config);

    let bytes = b"(alpha section of the document comes first. omega section of the document comes second) Tj";
    let result = pipeline.run(bytes).await.unwrap();

    // Echo enhancer: reassembly preserves chunk order
    let alpha = result.content.find("alpha").expect("alpha missing");
    let omega = result.content.find("omega").expect("omega missing");
    assert!(alpha < omega);
}

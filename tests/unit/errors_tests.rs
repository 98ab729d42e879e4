/*!
 * Tests for error types and their conversions
 */

use vocadeck::errors::{AppError, PackageError, PipelineError, SourceError, StoreError};

#[test]
fn test_source_error_display_shouldDescribeFailure() {
    assert_eq!(
        SourceError::Status { status_code: 503 }.to_string(),
        "Source responded with status 503"
    );
    assert_eq!(SourceError::Timeout(250).to_string(), "Timed out after 250 ms");
}

#[test]
fn test_pipeline_error_fromStoreAndPackage_shouldWrap() {
    let store: PipelineError = StoreError::Io {
        path: "cards_db.json".to_string(),
        message: "denied".to_string(),
    }
    .into();
    assert!(matches!(store, PipelineError::Store(_)));
    assert!(!store.is_cancelled());

    let package: PipelineError = PackageError::Empty.into();
    assert!(package.to_string().contains("nothing to package"));
}

#[test]
fn test_app_error_fromCancelledPipeline_shouldStayDetectable() {
    let error: AppError = PipelineError::Cancelled { stage: "Audio".to_string() }.into();
    match error {
        AppError::Pipeline(inner) => {
            assert!(inner.is_cancelled());
            assert_eq!(inner.to_string(), "Run cancelled during Audio");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

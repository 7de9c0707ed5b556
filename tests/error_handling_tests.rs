//! Tests for error normalization
//!
//! These tests verify that:
//! - Every failure mode surfaces through the same result shape
//! - Errors serialize to the conventional `{message, locations, path}` form
//! - Internal faults can be told apart from domain errors without matching

use graphql_pipeline::prelude::*;
use serde_json::json;
use std::time::Duration;

fn schema() -> Arc<Schema> {
    let query = ObjectType::new("Query")
        .field(
            FieldDefinition::new("hello", TypeRef::named("String"))
                .resolve_with(|_| Ok(json!("world"))),
        )
        .field(
            FieldDefinition::new("count", TypeRef::named_non_null("Int"))
                .resolve_with(|_| Ok(json!("many"))),
        );

    Arc::new(
        Schema::builder("Query")
            .object(query)
            .build()
            .expect("schema should build"),
    )
}

/// Executor that fails with whatever the test hands it
struct FailingExecutor {
    error: fn() -> anyhow::Error,
}

#[async_trait]
impl Executor for FailingExecutor {
    async fn execute(&self, _args: ExecutionArgs<'_>) -> Result<ExecutionResult> {
        Err((self.error)())
    }
}

struct PanickingExecutor;

#[async_trait]
impl Executor for PanickingExecutor {
    async fn execute(&self, _args: ExecutionArgs<'_>) -> Result<ExecutionResult> {
        panic!("executor state poisoned")
    }
}

struct HangingExecutor;

#[async_trait]
impl Executor for HangingExecutor {
    async fn execute(&self, _args: ExecutionArgs<'_>) -> Result<ExecutionResult> {
        futures::future::pending::<()>().await;
        Ok(ExecutionResult::default())
    }
}

// =============================================================================
// Result shape
// =============================================================================

mod result_shape_tests {
    use super::*;

    #[tokio::test]
    async fn test_syntax_error_serialization() {
        let result = execute(schema(), "{ hello", None, None, None, None).await;
        let json = result.to_json();

        assert!(json.get("data").is_none());
        assert_eq!(json["errors"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["errors"][0]["extensions"]["category"], "syntax");
    }

    #[tokio::test]
    async fn test_validation_error_has_location() {
        let result = execute(schema(), "{\n  hello\n  missing\n}", None, None, None, None).await;
        let json = result.to_json();

        assert_eq!(json["errors"][0]["locations"], json!([{ "line": 3, "column": 3 }]));
        assert_eq!(json["errors"][0]["extensions"]["category"], "validation");
        assert!(json["errors"][0].get("path").is_none());
    }

    #[tokio::test]
    async fn test_non_null_violation_nulls_the_whole_data() {
        let result = execute(schema(), "{ hello count }", None, None, None, None).await;

        assert_eq!(result.data, Some(Value::Null));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message(), "Int cannot represent value: \"many\"");
        assert_eq!(
            result.errors[0].path(),
            Some(&[PathSegment::Key("count".to_string())][..])
        );
    }

    #[tokio::test]
    async fn test_request_errors_leave_data_unset() {
        let text = "query A { hello } query B { hello }";
        let result = execute(schema(), text, None, None, None, None).await;

        assert!(result.data.is_none());
        assert_eq!(
            result.errors[0].message(),
            "Must provide operation name if query contains multiple operations."
        );
    }
}

// =============================================================================
// Fault normalization
// =============================================================================

mod fault_tests {
    use super::*;

    fn request() -> ExecutionRequest {
        ExecutionRequest::new(schema(), "{ hello }")
    }

    #[tokio::test]
    async fn test_graphql_error_from_executor_is_kept() {
        let pipeline = RequestPipeline::new().with_executor(Arc::new(FailingExecutor {
            error: || GraphQLError::execution("maintenance window").into(),
        }));
        let result = pipeline.execute(request()).await;

        assert!(result.data.is_none());
        assert_eq!(result.errors[0].message(), "maintenance window");
        assert_eq!(result.errors[0].category(), ErrorCategory::Execution);
        assert!(!result.has_internal_fault());
    }

    #[tokio::test]
    async fn test_foreign_error_becomes_internal() {
        let pipeline = RequestPipeline::new().with_executor(Arc::new(FailingExecutor {
            error: || anyhow::anyhow!("socket closed"),
        }));
        let result = pipeline.execute(request()).await;

        assert!(result.data.is_none());
        assert_eq!(result.errors.len(), 1);
        assert!(result.has_internal_fault());
        assert_eq!(result.errors[0].message(), "Internal error: socket closed");
    }

    #[tokio::test]
    async fn test_panic_becomes_internal() {
        let pipeline = RequestPipeline::new().with_executor(Arc::new(PanickingExecutor));
        let result = pipeline.execute(request()).await;

        assert!(result.has_internal_fault());
        assert_eq!(
            result.errors[0].message(),
            "Internal error: request processing panicked: executor state poisoned"
        );
    }

    #[tokio::test]
    async fn test_deadline_becomes_internal() {
        let pipeline = RequestPipeline::from_config(
            PipelineConfig::default().with_timeout(Duration::from_millis(20)),
        )
        .with_executor(Arc::new(HangingExecutor));
        let result = pipeline.execute(request()).await;

        assert!(result.data.is_none());
        assert!(result.has_internal_fault());
        assert_eq!(
            result.errors[0].message(),
            "Internal error: request timed out after 20ms"
        );
    }

    #[tokio::test]
    async fn test_spawned_panic_still_settles() {
        let pipeline = Arc::new(RequestPipeline::new().with_executor(Arc::new(PanickingExecutor)));
        let result = pipeline.spawn(request()).await;

        assert!(result.has_internal_fault());
    }

    #[test]
    fn test_fault_display() {
        let fault = Fault::Cancelled("task 7 was cancelled".to_string());
        assert_eq!(
            fault.to_string(),
            "Internal error: request task did not complete: task 7 was cancelled"
        );

        let error: GraphQLError = fault.into();
        assert!(error.is_internal());
    }
}

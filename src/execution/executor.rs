//! Executor seam and the default executor orchestration

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::field_resolver::{ExecutionContext, execute_selection_set};
use super::values::coerce_variable_values;
use crate::core::{Document, ExecutionResult, GraphQLError, RequestContext, Variables};
use crate::language::{OperationKind, fragment_map, select_operation};
use crate::schema::Schema;

/// Inputs of one execution
#[derive(Debug, Clone, Copy)]
pub struct ExecutionArgs<'a> {
    pub schema: &'a Schema,
    pub document: &'a Document,
    pub root_value: &'a Value,
    pub context: &'a RequestContext,
    pub variables: &'a Variables,
    pub operation_name: Option<&'a str>,
}

/// Walks a validated document against resolvers
///
/// Field-level failures belong in the returned result (partial data plus
/// errors). Returning an `Err` holding a [`GraphQLError`] aborts the request
/// with `data` unset; any other `Err` is treated as an internal fault.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, args: ExecutionArgs<'_>) -> Result<ExecutionResult>;
}

/// Default executor: resolves fields in document order
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExecutor;

impl DefaultExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Executor for DefaultExecutor {
    async fn execute(&self, args: ExecutionArgs<'_>) -> Result<ExecutionResult> {
        let operation = match select_operation(args.document, args.operation_name) {
            Ok(operation) => operation,
            Err(error) => return Ok(ExecutionResult::from_error(error)),
        };

        let root_type = match operation.kind {
            OperationKind::Query => args.schema.query_type(),
            OperationKind::Mutation => match args.schema.mutation_type() {
                Some(mutation) => mutation,
                None => {
                    return Ok(ExecutionResult::from_error(
                        GraphQLError::execution("Schema is not configured for mutations.")
                            .at(operation.position),
                    ));
                }
            },
            OperationKind::Subscription => {
                return Ok(ExecutionResult::from_error(
                    GraphQLError::execution("Subscriptions are not supported")
                        .at(operation.position),
                ));
            }
        };

        let variables =
            match coerce_variable_values(args.schema, operation.variable_definitions, args.variables)
            {
                Ok(variables) => variables,
                Err(errors) => return Ok(ExecutionResult::from_errors(errors)),
            };

        tracing::debug!(
            operation = ?operation.name,
            kind = %operation.kind,
            "executing operation"
        );

        let ctx = ExecutionContext::new(
            args.schema,
            fragment_map(args.document),
            args.root_value,
            args.context,
            variables,
        );

        let data = match execute_selection_set(
            &ctx,
            root_type,
            args.root_value.clone(),
            vec![operation.selection_set],
            Vec::new(),
        )
        .await
        {
            Ok(map) => Value::Object(map),
            Err(_) => Value::Null,
        };

        Ok(ExecutionResult::new(Some(data), ctx.into_errors()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ErrorCategory, PathSegment, Source};
    use crate::language::{GraphQLParser, QueryParser};
    use crate::schema::{ArgumentDefinition, EnumType, FieldDefinition, ObjectType, TypeRef};
    use serde_json::json;
    use std::sync::Mutex;

    struct Log(Mutex<Vec<String>>);

    fn schema() -> Schema {
        let user = ObjectType::new("User")
            .field(FieldDefinition::new("id", TypeRef::named_non_null("ID")))
            .field(FieldDefinition::new("name", TypeRef::named("String")))
            .field(FieldDefinition::new("role", TypeRef::named("Role")))
            .field(
                FieldDefinition::new("email", TypeRef::named_non_null("String"))
                    .resolve_with(|_| Err(anyhow::anyhow!("email is private"))),
            );

        let query = ObjectType::new("Query")
            .field(
                FieldDefinition::new("user", TypeRef::named("User"))
                    .argument(ArgumentDefinition::new("id", TypeRef::named_non_null("ID")))
                    .resolve_with(|info| {
                        let id = info.arg("id").and_then(Value::as_str).unwrap_or_default();
                        Ok(json!({ "id": id, "name": format!("user-{}", id), "role": "ADMIN" }))
                    }),
            )
            .field(
                FieldDefinition::new("users", TypeRef::list(TypeRef::named_non_null("User")))
                    .resolve_with(|_| Ok(json!([{ "id": "1" }, { "id": null }]))),
            )
            .field(
                FieldDefinition::new("count", TypeRef::named("Int"))
                    .resolve_with(|_| Ok(json!("not a number"))),
            )
            .field(FieldDefinition::new("greeting", TypeRef::named("String")))
            .field(
                FieldDefinition::new("boom", TypeRef::named("String"))
                    .resolve_with(|_| Err(GraphQLError::execution("kaboom").into())),
            );

        let mutation = ObjectType::new("Mutation").field(
            FieldDefinition::new("log", TypeRef::named("Int"))
                .argument(ArgumentDefinition::new("line", TypeRef::named_non_null("String")))
                .resolve_with(|info| {
                    let log = info.context.get::<Log>().expect("log context");
                    let mut lines = log.0.lock().unwrap();
                    lines.push(info.arg("line").and_then(Value::as_str).unwrap_or("").to_string());
                    Ok(json!(lines.len()))
                }),
        );

        Schema::builder("Query")
            .mutation("Mutation")
            .object(query)
            .object(user)
            .object(mutation)
            .enumeration(EnumType::new("Role", ["ADMIN", "MEMBER"]))
            .build()
            .unwrap()
    }

    async fn run(
        query: &str,
        root: Value,
        context: RequestContext,
        variables: Value,
        operation_name: Option<&str>,
    ) -> ExecutionResult {
        let schema = schema();
        let document = GraphQLParser::new()
            .parse(&Source::new(query, "test"))
            .expect("test query should parse");
        let variables = variables.as_object().cloned().unwrap_or_default();
        DefaultExecutor::new()
            .execute(ExecutionArgs {
                schema: &schema,
                document: &document,
                root_value: &root,
                context: &context,
                variables: &variables,
                operation_name,
            })
            .await
            .expect("default executor never faults")
    }

    async fn run_simple(query: &str) -> ExecutionResult {
        run(query, Value::Null, RequestContext::empty(), json!({}), None).await
    }

    #[tokio::test]
    async fn test_resolves_arguments_aliases_and_typename() {
        let result = run_simple(r#"{ a: user(id: "7") { __typename id name role } }"#).await;

        assert!(result.is_ok(), "unexpected errors: {:?}", result.errors);
        assert_eq!(
            result.data,
            Some(json!({ "a": { "__typename": "User", "id": "7", "name": "user-7", "role": "ADMIN" } }))
        );
    }

    #[tokio::test]
    async fn test_default_resolver_reads_root_value() {
        let result = run(
            "{ greeting }",
            json!({ "greeting": "hi" }),
            RequestContext::empty(),
            json!({}),
            None,
        )
        .await;
        assert_eq!(result.data, Some(json!({ "greeting": "hi" })));
    }

    #[tokio::test]
    async fn test_resolver_error_nulls_field_and_keeps_siblings() {
        let result = run_simple("{ greeting boom }").await;

        assert_eq!(result.data, Some(json!({ "greeting": null, "boom": null })));
        assert_eq!(result.errors.len(), 1);
        let error = &result.errors[0];
        assert_eq!(error.message(), "kaboom");
        assert_eq!(error.category(), ErrorCategory::Execution);
        assert_eq!(error.path(), Some(&[PathSegment::Key("boom".to_string())][..]));
    }

    #[tokio::test]
    async fn test_non_null_failure_propagates_to_nullable_parent() {
        let result = run_simple(r#"{ user(id: "1") { id email } }"#).await;

        assert_eq!(result.data, Some(json!({ "user": null })));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message(), "email is private");
    }

    #[tokio::test]
    async fn test_non_null_list_item_nulls_the_list() {
        let result = run_simple("{ users { id } }").await;

        assert_eq!(result.data, Some(json!({ "users": null })));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            result.errors[0].path(),
            Some(
                &[
                    PathSegment::Key("users".to_string()),
                    PathSegment::Index(1),
                    PathSegment::Key("id".to_string()),
                ][..]
            )
        );
    }

    #[tokio::test]
    async fn test_invalid_scalar_output_is_field_error() {
        let result = run_simple("{ count greeting }").await;
        assert_eq!(result.data, Some(json!({ "count": null, "greeting": null })));
        assert!(result.errors[0].message().starts_with("Int cannot represent value"));
    }

    #[tokio::test]
    async fn test_skip_include_and_fragments() {
        let query = r#"
            query Q($withName: Boolean!) {
                user(id: "2") {
                    ...Basics
                    ... on User { name @include(if: $withName) }
                    role @skip(if: true)
                }
            }
            fragment Basics on User { id }
        "#;

        let result = run(
            query,
            Value::Null,
            RequestContext::empty(),
            json!({ "withName": false }),
            None,
        )
        .await;
        assert_eq!(result.data, Some(json!({ "user": { "id": "2" } })));
    }

    #[tokio::test]
    async fn test_mutation_runs_serially_with_context() {
        let context = RequestContext::new(Log(Mutex::new(Vec::new())));
        let result = run(
            r#"mutation { first: log(line: "a") second: log(line: "b") }"#,
            Value::Null,
            context.clone(),
            json!({}),
            None,
        )
        .await;

        assert_eq!(result.data, Some(json!({ "first": 1, "second": 2 })));
        let log = context.get::<Log>().unwrap();
        assert_eq!(*log.0.lock().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn test_operation_name_selects_operation() {
        let query = r#"query A { greeting } query B { user(id: "9") { id } }"#;
        let result = run(query, Value::Null, RequestContext::empty(), json!({}), Some("B")).await;
        assert_eq!(result.data, Some(json!({ "user": { "id": "9" } })));

        let result = run_simple(query).await;
        assert!(result.data.is_none());
        assert_eq!(result.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_required_variable_is_request_error() {
        let result = run_simple("query Q($id: ID!) { user(id: $id) { id } }").await;

        assert!(result.data.is_none());
        assert_eq!(
            result.errors[0].message(),
            "Variable \"$id\" of required type \"ID!\" was not provided."
        );
    }

    #[tokio::test]
    async fn test_subscription_is_rejected() {
        let result = run_simple("subscription { greeting }").await;
        assert!(result.data.is_none());
        assert_eq!(result.errors[0].message(), "Subscriptions are not supported");
    }
}

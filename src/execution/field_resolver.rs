//! Field collection, resolution and value completion

use futures::future::{BoxFuture, FutureExt};
use graphql_parser::query::{Selection, TypeCondition};
use indexmap::IndexMap;
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::sync::Mutex;

use super::values::{argument_values, should_include};
use crate::core::{GraphQLError, PathSegment, RequestContext, Variables};
use crate::language::document::{Field, FragmentDefinition, SelectionSet};
use crate::schema::{NamedType, ObjectType, ResolveInfo, Schema, TypeRef};

/// A null landed on a non-null position; the error is already recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct NullPropagation;

type Completion = Result<Value, NullPropagation>;

/// State shared by every field of one operation
pub(super) struct ExecutionContext<'a> {
    pub schema: &'a Schema,
    pub fragments: IndexMap<&'a str, &'a FragmentDefinition>,
    pub root_value: &'a Value,
    pub context: &'a RequestContext,
    pub variables: Variables,
    errors: Mutex<Vec<GraphQLError>>,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        schema: &'a Schema,
        fragments: IndexMap<&'a str, &'a FragmentDefinition>,
        root_value: &'a Value,
        context: &'a RequestContext,
        variables: Variables,
    ) -> Self {
        Self {
            schema,
            fragments,
            root_value,
            context,
            variables,
            errors: Mutex::new(Vec::new()),
        }
    }

    fn report(&self, error: GraphQLError) {
        let mut errors = self.errors.lock().unwrap_or_else(|e| e.into_inner());
        errors.push(error);
    }

    pub fn into_errors(self) -> Vec<GraphQLError> {
        self.errors.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

/// Group the fields of `selection_set` by response key, honoring fragments
/// and `@skip`/`@include`
fn collect_fields<'a>(
    ctx: &ExecutionContext<'a>,
    object_type: &ObjectType,
    selection_set: &'a SelectionSet,
    fields: &mut IndexMap<String, Vec<&'a Field>>,
    visited_fragments: &mut HashSet<&'a str>,
) {
    for selection in &selection_set.items {
        match selection {
            Selection::Field(field) => {
                if !should_include(&field.directives, &ctx.variables) {
                    continue;
                }
                let key = field.alias.as_ref().unwrap_or(&field.name);
                fields.entry(key.clone()).or_default().push(field);
            }
            Selection::FragmentSpread(spread) => {
                if !should_include(&spread.directives, &ctx.variables) {
                    continue;
                }
                if !visited_fragments.insert(spread.fragment_name.as_str()) {
                    continue;
                }
                let Some(fragment) = ctx.fragments.get(spread.fragment_name.as_str()).copied()
                else {
                    continue;
                };
                if !type_condition_applies(Some(&fragment.type_condition), object_type) {
                    continue;
                }
                collect_fields(
                    ctx,
                    object_type,
                    &fragment.selection_set,
                    fields,
                    visited_fragments,
                );
            }
            Selection::InlineFragment(inline) => {
                if !should_include(&inline.directives, &ctx.variables) {
                    continue;
                }
                if !type_condition_applies(inline.type_condition.as_ref(), object_type) {
                    continue;
                }
                collect_fields(
                    ctx,
                    object_type,
                    &inline.selection_set,
                    fields,
                    visited_fragments,
                );
            }
        }
    }
}

fn type_condition_applies(
    condition: Option<&TypeCondition<'static, String>>,
    object_type: &ObjectType,
) -> bool {
    match condition {
        None => true,
        Some(TypeCondition::On(name)) => *name == object_type.name,
    }
}

/// Execute merged selection sets against `parent`, one field after another
pub(super) fn execute_selection_set<'a>(
    ctx: &'a ExecutionContext<'a>,
    object_type: &'a ObjectType,
    parent: Value,
    selection_sets: Vec<&'a SelectionSet>,
    path: Vec<PathSegment>,
) -> BoxFuture<'a, Result<Map<String, Value>, NullPropagation>> {
    async move {
        let mut grouped = IndexMap::new();
        let mut visited_fragments = HashSet::new();
        for selection_set in selection_sets {
            collect_fields(
                ctx,
                object_type,
                selection_set,
                &mut grouped,
                &mut visited_fragments,
            );
        }

        let mut result = Map::new();
        for (response_key, fields) in grouped {
            let mut field_path = path.clone();
            field_path.push(PathSegment::Key(response_key.clone()));

            if let Some(value) = resolve_field(ctx, object_type, &parent, fields, field_path).await? {
                result.insert(response_key, value);
            }
        }

        Ok(result)
    }
    .boxed()
}

/// Resolve one response key; `None` means the field is unknown to the type
async fn resolve_field<'a>(
    ctx: &'a ExecutionContext<'a>,
    object_type: &'a ObjectType,
    parent: &Value,
    fields: Vec<&'a Field>,
    path: Vec<PathSegment>,
) -> Result<Option<Value>, NullPropagation> {
    let field = fields[0];
    let field_name = field.name.as_str();

    if field_name == "__typename" {
        return Ok(Some(json!(object_type.name)));
    }

    let Some(definition) = object_type.get_field(field_name) else {
        return Ok(None);
    };

    let args = argument_values(Some(definition), &field.arguments, &ctx.variables);

    let resolved = match &definition.resolver {
        Some(resolver) => {
            let info = ResolveInfo {
                field_name,
                parent_type: &object_type.name,
                parent,
                args: &args,
                root: ctx.root_value,
                context: ctx.context,
                variables: &ctx.variables,
                path: &path,
            };
            resolver.resolve(&info).await
        }
        None => Ok(default_resolve(parent, field_name)),
    };

    let completed = match resolved {
        Ok(value) => complete_value(ctx, &definition.ty, fields, value, path).await,
        Err(e) => {
            let message = match e.downcast_ref::<GraphQLError>() {
                Some(graphql_error) => graphql_error.message().to_string(),
                None => e.to_string(),
            };
            tracing::debug!(field = %field_name, error = %message, "resolver failed");
            ctx.report(
                GraphQLError::execution(message)
                    .at(field.position)
                    .with_path(path),
            );
            Err(NullPropagation)
        }
    };

    absorb_null(&definition.ty, completed).map(Some)
}

/// Property of the parent object named like the field
fn default_resolve(parent: &Value, field_name: &str) -> Value {
    parent.get(field_name).cloned().unwrap_or(Value::Null)
}

/// A failed nullable position becomes `null`; a failed non-null one bubbles up
fn absorb_null(ty: &TypeRef, completion: Completion) -> Completion {
    match completion {
        Err(NullPropagation) if !ty.is_non_null() => Ok(Value::Null),
        other => other,
    }
}

/// Shape a resolved value according to the field's type
fn complete_value<'a>(
    ctx: &'a ExecutionContext<'a>,
    ty: &'a TypeRef,
    fields: Vec<&'a Field>,
    value: Value,
    path: Vec<PathSegment>,
) -> BoxFuture<'a, Completion> {
    async move {
        let field = fields[0];

        match ty {
            TypeRef::NonNull(inner) => {
                if value.is_null() {
                    ctx.report(
                        GraphQLError::execution(format!(
                            "Cannot return null for non-nullable field \"{}\".",
                            field.name
                        ))
                        .at(field.position)
                        .with_path(path),
                    );
                    return Err(NullPropagation);
                }
                complete_value(ctx, inner, fields, value, path).await
            }
            _ if value.is_null() => Ok(Value::Null),
            TypeRef::List(inner) => {
                let Value::Array(items) = value else {
                    ctx.report(
                        GraphQLError::execution(format!(
                            "Expected a list for field \"{}\", but did not find one.",
                            field.name
                        ))
                        .at(field.position)
                        .with_path(path),
                    );
                    return Err(NullPropagation);
                };

                let mut completed = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let mut item_path = path.clone();
                    item_path.push(PathSegment::Index(index));
                    let item =
                        complete_value(ctx, inner, fields.clone(), item, item_path).await;
                    completed.push(absorb_null(inner, item)?);
                }
                Ok(Value::Array(completed))
            }
            TypeRef::Named(name) => match ctx.schema.get_type(name) {
                Some(NamedType::Scalar(scalar)) => scalar.serialize(&value).ok_or_else(|| {
                    ctx.report(
                        GraphQLError::execution(format!(
                            "{} cannot represent value: {}",
                            scalar.name(),
                            value
                        ))
                        .at(field.position)
                        .with_path(path),
                    );
                    NullPropagation
                }),
                Some(NamedType::Enum(enum_type)) => match value.as_str() {
                    Some(s) if enum_type.contains(s) => Ok(value),
                    _ => {
                        ctx.report(
                            GraphQLError::execution(format!(
                                "Enum \"{}\" cannot represent value: {}",
                                enum_type.name, value
                            ))
                            .at(field.position)
                            .with_path(path),
                        );
                        Err(NullPropagation)
                    }
                },
                Some(NamedType::Object(object_type)) => {
                    let selection_sets = fields.iter().map(|f| &f.selection_set).collect();
                    execute_selection_set(ctx, object_type, value, selection_sets, path)
                        .await
                        .map(Value::Object)
                }
                None => {
                    ctx.report(
                        GraphQLError::execution(format!("Unknown type \"{}\".", name))
                            .at(field.position)
                            .with_path(path),
                    );
                    Err(NullPropagation)
                }
            },
        }
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absorb_null_respects_nullability() {
        let nullable = TypeRef::named("String");
        let non_null = TypeRef::named_non_null("String");

        assert_eq!(absorb_null(&nullable, Err(NullPropagation)), Ok(Value::Null));
        assert_eq!(absorb_null(&non_null, Err(NullPropagation)), Err(NullPropagation));
        assert_eq!(absorb_null(&non_null, Ok(json!("x"))), Ok(json!("x")));
    }

    #[test]
    fn test_default_resolve_reads_property() {
        let parent = json!({ "name": "ada", "age": 36 });
        assert_eq!(default_resolve(&parent, "name"), json!("ada"));
        assert_eq!(default_resolve(&parent, "email"), Value::Null);
        assert_eq!(default_resolve(&json!(5), "name"), Value::Null);
    }
}

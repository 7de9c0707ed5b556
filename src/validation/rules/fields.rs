//! Rules about fields and their arguments

use crate::core::GraphQLError;
use crate::schema::NamedType;
use crate::validation::visitor::visit_fields;
use crate::validation::{ValidationContext, ValidationRule};

/// Every selected field exists on its parent type
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldsOnCorrectType;

impl ValidationRule for FieldsOnCorrectType {
    fn name(&self) -> &'static str {
        "FieldsOnCorrectType"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphQLError> {
        let mut errors = Vec::new();
        visit_fields(ctx, |visit| {
            if visit.is_meta_field() || visit.definition.is_some() {
                return;
            }
            if let Some(parent) = visit.parent_type {
                errors.push(
                    GraphQLError::validation(format!(
                        "Cannot query field \"{}\" on type \"{}\".",
                        visit.field.name, parent.name
                    ))
                    .at(visit.field.position),
                );
            }
        });
        errors
    }
}

/// Leaf fields have no selection, object fields must have one
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarLeafs;

impl ValidationRule for ScalarLeafs {
    fn name(&self) -> &'static str {
        "ScalarLeafs"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphQLError> {
        let mut errors = Vec::new();
        visit_fields(ctx, |visit| {
            let Some(definition) = visit.definition else {
                return;
            };
            let Some(named) = ctx.schema.get_type(definition.ty.named_type()) else {
                return;
            };

            let field = visit.field;
            let has_selection = !field.selection_set.items.is_empty();
            match named {
                NamedType::Object(_) if !has_selection => errors.push(
                    GraphQLError::validation(format!(
                        "Field \"{}\" of type \"{}\" must have a selection of subfields. Did you mean \"{} {{ ... }}\"?",
                        field.name, definition.ty, field.name
                    ))
                    .at(field.position),
                ),
                leaf if leaf.is_leaf() && has_selection => errors.push(
                    GraphQLError::validation(format!(
                        "Field \"{}\" must not have a selection since type \"{}\" has no subfields.",
                        field.name, definition.ty
                    ))
                    .at(field.position),
                ),
                _ => {}
            }
        });
        errors
    }
}

/// Every argument passed to a field is declared by it
#[derive(Debug, Clone, Copy, Default)]
pub struct KnownArgumentNames;

impl ValidationRule for KnownArgumentNames {
    fn name(&self) -> &'static str {
        "KnownArgumentNames"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphQLError> {
        let mut errors = Vec::new();
        visit_fields(ctx, |visit| {
            let (Some(parent), Some(definition)) = (visit.parent_type, visit.definition) else {
                return;
            };
            for (name, _) in &visit.field.arguments {
                if !definition.args.contains_key(name) {
                    errors.push(
                        GraphQLError::validation(format!(
                            "Unknown argument \"{}\" on field \"{}.{}\".",
                            name, parent.name, definition.name
                        ))
                        .at(visit.field.position),
                    );
                }
            }
        });
        errors
    }
}

/// Non-null arguments without a default are always passed
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvidedRequiredArguments;

impl ValidationRule for ProvidedRequiredArguments {
    fn name(&self) -> &'static str {
        "ProvidedRequiredArguments"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphQLError> {
        let mut errors = Vec::new();
        visit_fields(ctx, |visit| {
            let Some(definition) = visit.definition else {
                return;
            };
            for arg in definition.args.values() {
                if !arg.ty.is_non_null() || arg.default_value.is_some() {
                    continue;
                }
                let provided = visit.field.arguments.iter().any(|(name, _)| *name == arg.name);
                if !provided {
                    errors.push(
                        GraphQLError::validation(format!(
                            "Field \"{}\" argument \"{}\" of type \"{}\" is required, but it was not provided.",
                            definition.name, arg.name, arg.ty
                        ))
                        .at(visit.field.position),
                    );
                }
            }
        });
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::rules::tests::{check, schema};

    #[test]
    fn test_unknown_fields_are_reported_per_parent() {
        let text = r#"
            { hello nope __typename user(id: 1) { bogus ...F } }
            fragment F on User { missing }
        "#;
        let errors = check(&FieldsOnCorrectType, &schema(), text);
        let messages: Vec<_> = errors.iter().map(|e| e.message()).collect();

        assert_eq!(
            messages,
            vec![
                "Cannot query field \"nope\" on type \"Query\".",
                "Cannot query field \"bogus\" on type \"User\".",
                "Cannot query field \"missing\" on type \"User\".",
            ]
        );
    }

    #[test]
    fn test_leaf_and_object_selections() {
        let errors = check(&ScalarLeafs, &schema(), "{ hello { length } }");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message(),
            "Field \"hello\" must not have a selection since type \"String\" has no subfields."
        );

        let errors = check(&ScalarLeafs, &schema(), "{ users }");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message(),
            "Field \"users\" of type \"[User]\" must have a selection of subfields. Did you mean \"users { ... }\"?"
        );

        assert!(check(&ScalarLeafs, &schema(), "{ users { role name } }").is_empty());
    }

    #[test]
    fn test_unknown_argument() {
        let errors = check(&KnownArgumentNames, &schema(), "{ users(first: 2, last: 3) { id } }");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "Unknown argument \"last\" on field \"Query.users\".");
    }

    #[test]
    fn test_missing_required_argument() {
        let errors = check(&ProvidedRequiredArguments, &schema(), "{ user { id } users { id } }");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message(),
            "Field \"user\" argument \"id\" of type \"ID!\" is required, but it was not provided."
        );
        assert!(errors[0].locations()[0].line > 0);
    }
}

//! Rules about operation variables

use std::collections::HashSet;

use crate::core::GraphQLError;
use crate::language::Operation;
use crate::validation::visitor::variable_usages;
use crate::validation::{ValidationContext, ValidationRule};

fn operation_suffix(operation: &Operation<'_>, verb: &str) -> String {
    match operation.name {
        Some(name) => format!(" {} operation \"{}\"", verb, name),
        None => String::new(),
    }
}

/// Every variable used by an operation is declared by it
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUndefinedVariables;

impl ValidationRule for NoUndefinedVariables {
    fn name(&self) -> &'static str {
        "NoUndefinedVariables"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphQLError> {
        let mut errors = Vec::new();
        for operation in &ctx.operations {
            let defined: HashSet<&str> = operation
                .variable_definitions
                .iter()
                .map(|def| def.name.as_str())
                .collect();

            for (name, position) in variable_usages(ctx, operation.selection_set) {
                if defined.contains(name) {
                    continue;
                }
                errors.push(
                    GraphQLError::validation(format!(
                        "Variable \"${}\" is not defined{}.",
                        name,
                        operation_suffix(operation, "by")
                    ))
                    .at_all([position, operation.position]),
                );
            }
        }
        errors
    }
}

/// Every variable declared by an operation is used by it
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUnusedVariables;

impl ValidationRule for NoUnusedVariables {
    fn name(&self) -> &'static str {
        "NoUnusedVariables"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphQLError> {
        let mut errors = Vec::new();
        for operation in &ctx.operations {
            let used: HashSet<&str> = variable_usages(ctx, operation.selection_set)
                .into_iter()
                .map(|(name, _)| name)
                .collect();

            for definition in operation.variable_definitions {
                if used.contains(definition.name.as_str()) {
                    continue;
                }
                errors.push(
                    GraphQLError::validation(format!(
                        "Variable \"${}\" is never used{}.",
                        definition.name,
                        operation_suffix(operation, "in")
                    ))
                    .at(definition.position),
                );
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::rules::tests::{check, schema};

    #[test]
    fn test_undefined_variable_in_named_and_anonymous_operations() {
        let errors = check(
            &NoUndefinedVariables,
            &schema(),
            "query Q { user(id: $id) { id } }",
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "Variable \"$id\" is not defined by operation \"Q\".");
        assert_eq!(errors[0].locations().len(), 2);

        let errors = check(&NoUndefinedVariables, &schema(), "{ user(id: $id) { id } }");
        assert_eq!(errors[0].message(), "Variable \"$id\" is not defined.");
    }

    #[test]
    fn test_variables_used_through_fragments_are_defined() {
        let text = r#"
            query Q($id: ID!, $first: Int) { user(id: $id) { ...F } }
            fragment F on User { friends(first: $first) { id } }
        "#;
        assert!(check(&NoUndefinedVariables, &schema(), text).is_empty());
        assert!(check(&NoUnusedVariables, &schema(), text).is_empty());
    }

    #[test]
    fn test_unused_variable() {
        let errors = check(
            &NoUnusedVariables,
            &schema(),
            "query Q($id: ID!, $extra: Int) { user(id: $id) { id } }",
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "Variable \"$extra\" is never used in operation \"Q\".");
    }

    #[test]
    fn test_skip_condition_counts_as_usage() {
        let text = "query Q($off: Boolean!) { hello @skip(if: $off) }";
        assert!(check(&NoUnusedVariables, &schema(), text).is_empty());
    }
}

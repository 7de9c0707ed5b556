//! Rules about operation definitions

use std::collections::HashSet;

use crate::core::GraphQLError;
use crate::validation::{ValidationContext, ValidationRule};

/// Operation names are unique within a document
#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueOperationNames;

impl ValidationRule for UniqueOperationNames {
    fn name(&self) -> &'static str {
        "UniqueOperationNames"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphQLError> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut errors = Vec::new();

        for operation in &ctx.operations {
            let Some(name) = operation.name else {
                continue;
            };
            if !seen.insert(name) && reported.insert(name) {
                errors.push(
                    GraphQLError::validation(format!(
                        "There can be only one operation named \"{}\".",
                        name
                    ))
                    .at(operation.position),
                );
            }
        }
        errors
    }
}

/// An anonymous operation must be the only operation of its document
#[derive(Debug, Clone, Copy, Default)]
pub struct LoneAnonymousOperation;

impl ValidationRule for LoneAnonymousOperation {
    fn name(&self) -> &'static str {
        "LoneAnonymousOperation"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphQLError> {
        if ctx.operations.len() < 2 {
            return Vec::new();
        }
        ctx.operations
            .iter()
            .filter(|operation| operation.name.is_none())
            .map(|operation| {
                GraphQLError::validation(
                    "This anonymous operation must be the only defined operation.",
                )
                .at(operation.position)
            })
            .collect()
    }
}

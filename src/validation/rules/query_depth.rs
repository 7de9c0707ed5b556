//! Maximum nesting depth of an operation

use graphql_parser::query::Selection;
use std::collections::HashMap;

use crate::core::GraphQLError;
use crate::language::document::SelectionSet;
use crate::validation::{ValidationContext, ValidationRule};

enum Computation<T> {
    InProgress,
    Done(T),
}

/// Rejects operations nested deeper than a limit; `0` disables the check
///
/// Root fields sit at depth 1. Fragments count at the depth they are spread.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryDepth {
    max_query_depth: u32,
}

impl QueryDepth {
    pub const NAME: &'static str = "QueryDepth";

    pub fn new(max_query_depth: u32) -> Self {
        Self { max_query_depth }
    }

    pub fn max_query_depth(&self) -> u32 {
        self.max_query_depth
    }

    pub fn set_max_query_depth(&mut self, max_query_depth: u32) {
        self.max_query_depth = max_query_depth;
    }
}

impl ValidationRule for QueryDepth {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphQLError> {
        if self.max_query_depth == 0 {
            return Vec::new();
        }

        let mut fragment_cache = HashMap::new();
        let mut errors = Vec::new();
        for operation in &ctx.operations {
            let depth = measure(ctx, &mut fragment_cache, operation.selection_set);
            if depth > self.max_query_depth {
                tracing::warn!(
                    depth,
                    max = self.max_query_depth,
                    operation = ?operation.name,
                    "request exceeded depth limit"
                );
                errors.push(
                    GraphQLError::validation(format!(
                        "Max query depth should be {} but got {}.",
                        self.max_query_depth, depth
                    ))
                    .at(operation.position),
                );
            }
        }
        errors
    }
}

/// Deepest field path below `selection_set`
fn measure<'a>(
    ctx: &ValidationContext<'a>,
    fragment_cache: &mut HashMap<&'a str, Computation<u32>>,
    selection_set: &'a SelectionSet,
) -> u32 {
    let mut depth = 0;
    for selection in &selection_set.items {
        let nested = match selection {
            Selection::Field(field) => 1 + measure(ctx, fragment_cache, &field.selection_set),
            Selection::InlineFragment(inline) => {
                measure(ctx, fragment_cache, &inline.selection_set)
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.fragment_name.as_str();
                match fragment_cache.get(name) {
                    Some(Computation::Done(cached)) => *cached,
                    // cycles are reported by NoFragmentCycles
                    Some(Computation::InProgress) => continue,
                    None => {
                        let Some(fragment) = ctx.fragments.get(name) else {
                            continue;
                        };
                        fragment_cache.insert(name, Computation::InProgress);
                        let nested = measure(ctx, fragment_cache, &fragment.selection_set);
                        fragment_cache.insert(name, Computation::Done(nested));
                        nested
                    }
                }
            }
        };
        depth = depth.max(nested);
    }
    depth
}

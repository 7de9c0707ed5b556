//! Rules about fragment definitions and spreads

use std::collections::HashSet;

use crate::core::GraphQLError;
use crate::validation::visitor::{direct_spreads, reachable_fragments};
use crate::validation::{ValidationContext, ValidationRule};

/// Every spread names a defined fragment
#[derive(Debug, Clone, Copy, Default)]
pub struct KnownFragmentNames;

impl ValidationRule for KnownFragmentNames {
    fn name(&self) -> &'static str {
        "KnownFragmentNames"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphQLError> {
        let selection_sets = ctx
            .operations
            .iter()
            .map(|op| op.selection_set)
            .chain(ctx.fragments.values().map(|fragment| &fragment.selection_set));

        let mut errors = Vec::new();
        for selection_set in selection_sets {
            for (name, position) in direct_spreads(selection_set) {
                if !ctx.fragments.contains_key(name) {
                    errors.push(
                        GraphQLError::validation(format!("Unknown fragment \"{}\".", name))
                            .at(position),
                    );
                }
            }
        }
        errors
    }
}

/// Every fragment is reachable from some operation
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUnusedFragments;

impl ValidationRule for NoUnusedFragments {
    fn name(&self) -> &'static str {
        "NoUnusedFragments"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphQLError> {
        let used: HashSet<&str> = ctx
            .operations
            .iter()
            .flat_map(|op| reachable_fragments(ctx, op.selection_set))
            .collect();

        crate::language::document::fragments(ctx.document)
            .into_iter()
            .filter(|fragment| !used.contains(fragment.name.as_str()))
            .map(|fragment| {
                GraphQLError::validation(format!("Fragment \"{}\" is never used.", fragment.name))
                    .at(fragment.position)
            })
            .collect()
    }
}

/// No fragment spreads itself, directly or through other fragments
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFragmentCycles;

impl ValidationRule for NoFragmentCycles {
    fn name(&self) -> &'static str {
        "NoFragmentCycles"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphQLError> {
        let mut errors = Vec::new();
        let mut reported = HashSet::new();

        for fragment in crate::language::document::fragments(ctx.document) {
            let name = fragment.name.as_str();
            if reported.contains(name) {
                continue;
            }

            let mut cycle = Vec::new();
            if spreads_back(ctx, name, name, &mut cycle, &mut HashSet::new()) {
                reported.extend(cycle.iter().copied());
                let via = if cycle.len() > 1 {
                    format!(" via {}", cycle[1..].join(", "))
                } else {
                    String::new()
                };
                errors.push(
                    GraphQLError::validation(format!(
                        "Cannot spread fragment \"{}\" within itself{}.",
                        name, via
                    ))
                    .at(fragment.position),
                );
            }
        }
        errors
    }
}

/// Depth-first search for a spread of `target` starting at `current`
fn spreads_back<'a>(
    ctx: &ValidationContext<'a>,
    target: &str,
    current: &'a str,
    path: &mut Vec<&'a str>,
    visited: &mut HashSet<&'a str>,
) -> bool {
    if !visited.insert(current) {
        return false;
    }
    let Some(fragment) = ctx.fragments.get(current) else {
        return false;
    };

    path.push(current);
    for (name, _) in direct_spreads(&fragment.selection_set) {
        if name == target || spreads_back(ctx, target, name, path, visited) {
            return true;
        }
    }
    path.pop();
    false
}

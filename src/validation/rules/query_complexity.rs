//! Estimated cost of an operation
//!
//! Each field costs `children + 1` unless its definition carries a custom
//! cost function, which receives the children's cost and the field's
//! argument values. Arguments bound to variables are read from the values
//! the rule was configured with, so the cost of the same document may change
//! from one request to the next.
//!
//! Those values are the raw ones the caller sent, before input coercion: a
//! single value passed for a list-typed variable reaches a cost function as
//! that bare value, even though the executor later runs it as a one-element
//! list.

use graphql_parser::query::Selection;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{GraphQLError, Variables};
use crate::execution::values::{argument_values, should_include, with_variable_defaults};
use crate::language::document::SelectionSet;
use crate::schema::ObjectType;
use crate::validation::visitor::{condition_type, root_type};
use crate::validation::{ValidationContext, ValidationRule};

enum Computation<T> {
    InProgress,
    Done(T),
}

/// Rejects operations whose estimated cost exceeds a limit; `0` disables the check
#[derive(Debug, Clone, Default)]
pub struct QueryComplexity {
    max_query_complexity: u64,
    raw_variable_values: Variables,
}

impl QueryComplexity {
    pub const NAME: &'static str = "QueryComplexity";

    pub fn new(max_query_complexity: u64) -> Self {
        Self {
            max_query_complexity,
            raw_variable_values: Variables::new(),
        }
    }

    pub fn max_query_complexity(&self) -> u64 {
        self.max_query_complexity
    }

    pub fn set_max_query_complexity(&mut self, max_query_complexity: u64) {
        self.max_query_complexity = max_query_complexity;
    }

    /// Variable values used to evaluate arguments; `None` clears them
    ///
    /// The values are taken as given and are not coerced to their declared
    /// types.
    pub fn set_raw_variable_values(&mut self, variables: Option<Variables>) {
        self.raw_variable_values = variables.unwrap_or_default();
    }

    /// A copy of this rule bound to `variables`
    pub fn with_raw_variable_values(&self, variables: &Variables) -> Self {
        Self {
            max_query_complexity: self.max_query_complexity,
            raw_variable_values: variables.clone(),
        }
    }

    pub fn raw_variable_values(&self) -> &Variables {
        &self.raw_variable_values
    }
}

impl ValidationRule for QueryComplexity {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphQLError> {
        let max = self.max_query_complexity;
        if max == 0 {
            return Vec::new();
        }

        let mut errors = Vec::new();
        for operation in &ctx.operations {
            let variables =
                with_variable_defaults(operation.variable_definitions, &self.raw_variable_values);
            let mut estimator = CostEstimator {
                ctx,
                variables: &variables,
                fragment_cache: HashMap::new(),
            };
            let cost = estimator.selection_cost(root_type(ctx, operation), operation.selection_set);

            if cost > max {
                tracing::warn!(
                    cost,
                    max,
                    operation = ?operation.name,
                    "request exceeded complexity limit"
                );
                errors.push(
                    GraphQLError::validation(format!(
                        "Max query complexity should be {} but got {}.",
                        max, cost
                    ))
                    .at(operation.position),
                );
            }
        }
        errors
    }

    fn with_variables(&self, variables: &Variables) -> Option<Arc<dyn ValidationRule>> {
        Some(Arc::new(self.with_raw_variable_values(variables)))
    }
}

struct CostEstimator<'c, 'a> {
    ctx: &'c ValidationContext<'a>,
    variables: &'c Variables,
    fragment_cache: HashMap<&'a str, Computation<u64>>,
}

impl<'a> CostEstimator<'_, 'a> {
    fn selection_cost(&mut self, parent: Option<&'a ObjectType>, selection_set: &'a SelectionSet) -> u64 {
        let mut total: u64 = 0;
        for selection in &selection_set.items {
            let cost = match selection {
                Selection::Field(field) => {
                    if !should_include(&field.directives, self.variables) {
                        continue;
                    }
                    let definition = parent.and_then(|p| p.get_field(&field.name));
                    let child = definition.and_then(|d| self.ctx.schema.object(d.ty.named_type()));
                    let children = self.selection_cost(child, &field.selection_set);

                    match definition {
                        Some(definition) => {
                            let args = argument_values(Some(definition), &field.arguments, self.variables);
                            definition.cost(children, &args)
                        }
                        None => children.saturating_add(1),
                    }
                }
                Selection::InlineFragment(inline) => {
                    if !should_include(&inline.directives, self.variables) {
                        continue;
                    }
                    let scope = match &inline.type_condition {
                        Some(condition) => condition_type(self.ctx, condition),
                        None => parent,
                    };
                    self.selection_cost(scope, &inline.selection_set)
                }
                Selection::FragmentSpread(spread) => {
                    if !should_include(&spread.directives, self.variables) {
                        continue;
                    }
                    let name = spread.fragment_name.as_str();
                    match self.fragment_cache.get(name) {
                        Some(Computation::Done(cached)) => *cached,
                        Some(Computation::InProgress) => continue,
                        None => {
                            let Some(fragment) = self.ctx.fragments.get(name).copied() else {
                                continue;
                            };
                            self.fragment_cache.insert(name, Computation::InProgress);
                            let scope = condition_type(self.ctx, &fragment.type_condition);
                            let cost = self.selection_cost(scope, &fragment.selection_set);
                            self.fragment_cache.insert(name, Computation::Done(cost));
                            cost
                        }
                    }
                }
            };
            total = total.saturating_add(cost);
        }
        total
    }
}

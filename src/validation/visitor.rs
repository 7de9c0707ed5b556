//! Document walks shared by the validation rules

use graphql_parser::Pos;
use graphql_parser::query::{Selection, TypeCondition, Value as GqlValue};
use std::collections::HashSet;

use super::ValidationContext;
use crate::language::Operation;
use crate::language::OperationKind;
use crate::language::document::{Field, SelectionSet};
use crate::schema::{FieldDefinition, ObjectType};

/// A field reached by [`visit_fields`], with what the schema knows about it
#[derive(Debug, Clone, Copy)]
pub struct FieldVisit<'a> {
    /// `None` when the enclosing type is unknown (not an error by itself)
    pub parent_type: Option<&'a ObjectType>,
    pub field: &'a Field,
    pub definition: Option<&'a FieldDefinition>,
}

impl FieldVisit<'_> {
    pub fn is_meta_field(&self) -> bool {
        self.field.name.starts_with("__")
    }
}

/// Root object type of an operation, if the schema has one
pub fn root_type<'a>(ctx: &ValidationContext<'a>, operation: &Operation<'_>) -> Option<&'a ObjectType> {
    match operation.kind {
        OperationKind::Query => Some(ctx.schema.query_type()),
        OperationKind::Mutation => ctx.schema.mutation_type(),
        OperationKind::Subscription => None,
    }
}

/// Object type named by a type condition
pub fn condition_type<'a>(
    ctx: &ValidationContext<'a>,
    condition: &TypeCondition<'static, String>,
) -> Option<&'a ObjectType> {
    let TypeCondition::On(name) = condition;
    ctx.schema.object(name)
}

/// Visit every field of every operation and fragment definition, with type info
///
/// Fragment spreads are not followed: each fragment definition is walked once
/// from its own type condition.
pub fn visit_fields<'a, F>(ctx: &ValidationContext<'a>, mut visit: F)
where
    F: FnMut(&FieldVisit<'a>),
{
    for operation in &ctx.operations {
        let parent = root_type(ctx, operation);
        walk_typed(ctx, parent, operation.selection_set, &mut visit);
    }
    for fragment in ctx.fragments.values() {
        let parent = condition_type(ctx, &fragment.type_condition);
        walk_typed(ctx, parent, &fragment.selection_set, &mut visit);
    }
}

fn walk_typed<'a, F>(
    ctx: &ValidationContext<'a>,
    parent: Option<&'a ObjectType>,
    selection_set: &'a SelectionSet,
    visit: &mut F,
) where
    F: FnMut(&FieldVisit<'a>),
{
    for selection in &selection_set.items {
        match selection {
            Selection::Field(field) => {
                let definition = parent.and_then(|p| p.get_field(&field.name));
                visit(&FieldVisit {
                    parent_type: parent,
                    field,
                    definition,
                });
                let child = definition.and_then(|d| ctx.schema.object(d.ty.named_type()));
                walk_typed(ctx, child, &field.selection_set, visit);
            }
            Selection::InlineFragment(inline) => {
                let scope = match &inline.type_condition {
                    Some(condition) => condition_type(ctx, condition),
                    None => parent,
                };
                walk_typed(ctx, scope, &inline.selection_set, visit);
            }
            Selection::FragmentSpread(_) => {}
        }
    }
}

/// Names of the fragments spread directly inside `selection_set`, at any depth
pub fn direct_spreads(selection_set: &SelectionSet) -> Vec<(&str, Pos)> {
    let mut spreads = Vec::new();
    collect_spreads(selection_set, &mut spreads);
    spreads
}

fn collect_spreads<'a>(selection_set: &'a SelectionSet, spreads: &mut Vec<(&'a str, Pos)>) {
    for selection in &selection_set.items {
        match selection {
            Selection::Field(field) => collect_spreads(&field.selection_set, spreads),
            Selection::InlineFragment(inline) => collect_spreads(&inline.selection_set, spreads),
            Selection::FragmentSpread(spread) => {
                spreads.push((spread.fragment_name.as_str(), spread.position))
            }
        }
    }
}

/// Fragments reachable from `selection_set` through spreads, transitively
pub fn reachable_fragments<'a>(
    ctx: &ValidationContext<'a>,
    selection_set: &'a SelectionSet,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    let mut pending: Vec<&'a str> = direct_spreads(selection_set)
        .into_iter()
        .map(|(name, _)| name)
        .collect();

    while let Some(name) = pending.pop() {
        if !seen.insert(name) {
            continue;
        }
        if let Some(fragment) = ctx.fragments.get(name) {
            pending.extend(
                direct_spreads(&fragment.selection_set)
                    .into_iter()
                    .map(|(name, _)| name),
            );
        }
    }
    seen
}

/// Variables referenced in arguments and directives of `selection_set`,
/// including the fragments it reaches
pub fn variable_usages<'a>(
    ctx: &ValidationContext<'a>,
    selection_set: &'a SelectionSet,
) -> Vec<(&'a str, Pos)> {
    let mut usages = Vec::new();
    collect_variables(selection_set, &mut usages);
    for name in reachable_fragments(ctx, selection_set) {
        if let Some(fragment) = ctx.fragments.get(name) {
            collect_variables(&fragment.selection_set, &mut usages);
        }
    }
    usages
}

fn collect_variables<'a>(selection_set: &'a SelectionSet, usages: &mut Vec<(&'a str, Pos)>) {
    for selection in &selection_set.items {
        match selection {
            Selection::Field(field) => {
                for (_, value) in &field.arguments {
                    value_variables(value, field.position, usages);
                }
                for directive in &field.directives {
                    for (_, value) in &directive.arguments {
                        value_variables(value, directive.position, usages);
                    }
                }
                collect_variables(&field.selection_set, usages);
            }
            Selection::InlineFragment(inline) => {
                for directive in &inline.directives {
                    for (_, value) in &directive.arguments {
                        value_variables(value, directive.position, usages);
                    }
                }
                collect_variables(&inline.selection_set, usages);
            }
            Selection::FragmentSpread(spread) => {
                for directive in &spread.directives {
                    for (_, value) in &directive.arguments {
                        value_variables(value, directive.position, usages);
                    }
                }
            }
        }
    }
}

fn value_variables<'a>(value: &'a GqlValue<'static, String>, position: Pos, usages: &mut Vec<(&'a str, Pos)>) {
    match value {
        GqlValue::Variable(name) => usages.push((name.as_str(), position)),
        GqlValue::List(items) => {
            for item in items {
                value_variables(item, position, usages);
            }
        }
        GqlValue::Object(fields) => {
            for item in fields.values() {
                value_variables(item, position, usages);
            }
        }
        _ => {}
    }
}

//! Read-only views over a parsed document

use graphql_parser::Pos;
use graphql_parser::query::{self, Definition, OperationDefinition};
use indexmap::IndexMap;
use std::fmt;

use crate::core::{Document, GraphQLError};

pub type Field = query::Field<'static, String>;
pub type SelectionSet = query::SelectionSet<'static, String>;
pub type FragmentDefinition = query::FragmentDefinition<'static, String>;
pub type VariableDefinition = query::VariableDefinition<'static, String>;
pub type AstDirective = query::Directive<'static, String>;

/// Kind of an operation definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Query => f.write_str("query"),
            OperationKind::Mutation => f.write_str("mutation"),
            OperationKind::Subscription => f.write_str("subscription"),
        }
    }
}

/// Uniform view of the four operation shapes of the AST
#[derive(Debug, Clone, Copy)]
pub struct Operation<'a> {
    pub kind: OperationKind,
    pub name: Option<&'a str>,
    pub position: Pos,
    pub variable_definitions: &'a [VariableDefinition],
    pub directives: &'a [AstDirective],
    pub selection_set: &'a SelectionSet,
}

impl<'a> Operation<'a> {
    fn from_ast(definition: &'a OperationDefinition<'static, String>) -> Self {
        match definition {
            OperationDefinition::SelectionSet(selection_set) => Operation {
                kind: OperationKind::Query,
                name: None,
                position: selection_set.span.0,
                variable_definitions: &[],
                directives: &[],
                selection_set,
            },
            OperationDefinition::Query(q) => Operation {
                kind: OperationKind::Query,
                name: q.name.as_deref(),
                position: q.position,
                variable_definitions: &q.variable_definitions,
                directives: &q.directives,
                selection_set: &q.selection_set,
            },
            OperationDefinition::Mutation(m) => Operation {
                kind: OperationKind::Mutation,
                name: m.name.as_deref(),
                position: m.position,
                variable_definitions: &m.variable_definitions,
                directives: &m.directives,
                selection_set: &m.selection_set,
            },
            OperationDefinition::Subscription(s) => Operation {
                kind: OperationKind::Subscription,
                name: s.name.as_deref(),
                position: s.position,
                variable_definitions: &s.variable_definitions,
                directives: &s.directives,
                selection_set: &s.selection_set,
            },
        }
    }
}

/// All operations of a document, in document order
pub fn operations(document: &Document) -> Vec<Operation<'_>> {
    document
        .definitions
        .iter()
        .filter_map(|definition| match definition {
            Definition::Operation(op) => Some(Operation::from_ast(op)),
            Definition::Fragment(_) => None,
        })
        .collect()
}

/// All fragment definitions of a document, in document order
pub fn fragments(document: &Document) -> Vec<&FragmentDefinition> {
    document
        .definitions
        .iter()
        .filter_map(|definition| match definition {
            Definition::Fragment(fragment) => Some(fragment),
            Definition::Operation(_) => None,
        })
        .collect()
}

/// Fragments by name (the first definition wins on duplicates)
pub fn fragment_map(document: &Document) -> IndexMap<&str, &FragmentDefinition> {
    let mut map = IndexMap::new();
    for fragment in fragments(document) {
        map.entry(fragment.name.as_str()).or_insert(fragment);
    }
    map
}

/// Pick the operation to run
///
/// Without a name, the document must hold exactly one operation.
pub fn select_operation<'a>(
    document: &'a Document,
    operation_name: Option<&str>,
) -> Result<Operation<'a>, GraphQLError> {
    let operations = operations(document);

    match operation_name {
        Some(name) => operations
            .into_iter()
            .find(|op| op.name == Some(name))
            .ok_or_else(|| {
                GraphQLError::execution(format!("Unknown operation named \"{}\".", name))
            }),
        None => match operations.as_slice() {
            [] => Err(GraphQLError::execution("Must provide an operation.")),
            [single] => Ok(*single),
            _ => Err(GraphQLError::execution(
                "Must provide operation name if query contains multiple operations.",
            )),
        },
    }
}

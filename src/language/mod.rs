//! Query language front-end
//!
//! Parsing is delegated to `graphql_parser`; this module adapts it to the
//! pipeline's source labels and error shape, and offers read-only views over
//! the resulting document.

pub mod document;
mod parser;

pub use document::{Operation, OperationKind, fragment_map, operations, select_operation};
pub use parser::{GraphQLParser, QueryParser};

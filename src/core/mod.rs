//! Core types shared by every stage of the pipeline

pub mod context;
pub mod error;
pub mod result;
pub mod source;

pub use context::{RequestContext, Variables};
pub use error::{ErrorCategory, Fault, GraphQLError, PathSegment, SchemaError, SourceLocation};
pub use result::ExecutionResult;
pub use source::{DEFAULT_SOURCE_NAME, Document, QueryInput, Source};

//! Typed error handling for the request pipeline
//!
//! Every failure a request can run into ends up as a [`GraphQLError`] inside an
//! [`ExecutionResult`](crate::core::ExecutionResult). Errors are tagged with an
//! [`ErrorCategory`] so callers can tell apart the stage that produced them.
//!
//! # Error Categories
//!
//! - [`ErrorCategory::Syntax`]: malformed query text, detected while parsing
//! - [`ErrorCategory::Validation`]: schema/document mismatch or an exceeded limit
//! - [`ErrorCategory::Execution`]: raised while resolving a field
//! - [`ErrorCategory::Internal`]: an unanticipated [`Fault`], normalized at the boundary
//!
//! # Example
//!
//! ```rust,ignore
//! use graphql_pipeline::prelude::*;
//!
//! let result = execute(schema, "{ invalidSyntax", None, None, None, None).await;
//! match result.errors.first().map(|e| e.category()) {
//!     Some(ErrorCategory::Syntax) => println!("fix your query"),
//!     Some(ErrorCategory::Internal) => eprintln!("server fault"),
//!     _ => {}
//! }
//! ```

use graphql_parser::Pos;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Stage that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed query text
    Syntax,

    /// Document rejected by a validation rule
    Validation,

    /// Field resolution or request-level execution failure
    Execution,

    /// Unanticipated fault caught at the pipeline boundary
    Internal,
}

impl ErrorCategory {
    /// Wire name used under `extensions.category`
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Syntax => "syntax",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Execution => "execution",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line/column position in the query source (both 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl From<Pos> for SourceLocation {
    fn from(pos: Pos) -> Self {
        Self {
            line: pos.line,
            column: pos.column,
        }
    }
}

/// One segment of a response path: an object key or a list index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// A location-tagged GraphQL error
///
/// This is the "GraphQL error kind" of the pipeline: anything of this type
/// raised by a stage is caught and turned into a result with `data` unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQLError {
    message: String,
    locations: Vec<SourceLocation>,
    path: Option<Vec<PathSegment>>,
    category: ErrorCategory,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>, category: ErrorCategory) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: None,
            category,
        }
    }

    /// Malformed query text at `location`
    pub fn syntax(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
        let mut err = Self::new(message, ErrorCategory::Syntax);
        err.locations.extend(location);
        err
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(message, ErrorCategory::Validation)
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(message, ErrorCategory::Execution)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(message, ErrorCategory::Internal)
    }

    /// Attach a source location
    pub fn at(mut self, location: impl Into<SourceLocation>) -> Self {
        self.locations.push(location.into());
        self
    }

    /// Attach several source locations
    pub fn at_all<I, L>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<SourceLocation>,
    {
        self.locations.extend(locations.into_iter().map(Into::into));
        self
    }

    /// Attach the response path of the failing field
    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = Some(path);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn locations(&self) -> &[SourceLocation] {
        &self.locations
    }

    pub fn path(&self) -> Option<&[PathSegment]> {
        self.path.as_deref()
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn is_internal(&self) -> bool {
        self.category == ErrorCategory::Internal
    }
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(location) = self.locations.first() {
            write!(f, " ({}:{})", location.line, location.column)?;
        }
        Ok(())
    }
}

impl std::error::Error for GraphQLError {}

impl Serialize for GraphQLError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("message", &self.message)?;
        if !self.locations.is_empty() {
            map.serialize_entry("locations", &self.locations)?;
        }
        if let Some(path) = &self.path {
            map.serialize_entry("path", path)?;
        }
        map.serialize_entry(
            "extensions",
            &serde_json::json!({ "category": self.category.as_str() }),
        )?;
        map.end()
    }
}

/// A fault that is not a [`GraphQLError`]
///
/// These only ever reach the outermost boundary of the pipeline, which turns
/// them into an `Internal` error instead of letting them escape.
#[derive(Debug, thiserror::Error)]
pub enum Fault {
    /// A stage panicked
    #[error("Internal error: request processing panicked: {0}")]
    Panic(String),

    /// The configured deadline elapsed before the request settled
    #[error("Internal error: request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The task running a deferred request was cancelled or aborted
    #[error("Internal error: request task did not complete: {0}")]
    Cancelled(String),

    /// Any other unrecognized failure
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<Fault> for GraphQLError {
    fn from(fault: Fault) -> Self {
        GraphQLError::internal(fault.to_string())
    }
}

/// Errors raised while assembling a [`Schema`](crate::schema::Schema)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Query root type '{0}' is not registered")]
    MissingQueryType(String),

    #[error("Mutation root type '{0}' is not registered")]
    MissingMutationType(String),

    #[error("Root type '{0}' must be an object type")]
    RootNotObject(String),

    #[error("Type '{0}' is registered more than once")]
    DuplicateType(String),

    #[error("Field '{type_name}.{field}' references unknown type '{referenced}'")]
    UnknownType {
        type_name: String,
        field: String,
        referenced: String,
    },
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_includes_first_location() {
        let err = GraphQLError::syntax("Unexpected end of input", Some(SourceLocation::new(1, 16)));
        assert_eq!(err.to_string(), "Unexpected end of input (1:16)");
        assert_eq!(err.category(), ErrorCategory::Syntax);
    }

    #[test]
    fn test_serialize_full_error() {
        let err = GraphQLError::execution("boom")
            .at(SourceLocation::new(3, 5))
            .with_path(vec!["user".into(), 0.into(), "name".into()]);

        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(
            value,
            json!({
                "message": "boom",
                "locations": [{ "line": 3, "column": 5 }],
                "path": ["user", 0, "name"],
                "extensions": { "category": "execution" }
            })
        );
    }

    #[test]
    fn test_serialize_omits_empty_locations_and_path() {
        let err = GraphQLError::validation("bad");
        let value = serde_json::to_value(&err).unwrap();
        assert!(value.get("locations").is_none());
        assert!(value.get("path").is_none());
        assert_eq!(value["extensions"]["category"], "validation");
    }

    #[test]
    fn test_fault_converts_to_internal_error() {
        let err: GraphQLError = Fault::Timeout(Duration::from_millis(250)).into();
        assert!(err.is_internal());
        assert!(err.message().contains("250ms"));

        let err: GraphQLError = Fault::Internal(anyhow::anyhow!("disk on fire")).into();
        assert_eq!(err.message(), "Internal error: disk on fire");
    }

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::UnknownType {
            type_name: "Query".to_string(),
            field: "user".to_string(),
            referenced: "User".to_string(),
        };
        assert!(err.to_string().contains("Query.user"));
        assert!(err.to_string().contains("User"));
    }
}

//! Query sources and parsed documents

use std::sync::Arc;

/// Label given to query text that arrives without one
pub const DEFAULT_SOURCE_NAME: &str = "GraphQL request";

/// A parsed, owned executable document
pub type Document = graphql_parser::query::Document<'static, String>;

/// Raw query text plus a label used in diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub body: String,
    pub name: String,
}

impl Source {
    pub fn new(body: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            name: name.into(),
        }
    }
}

/// What the caller hands in: text to parse, or a document parsed earlier
///
/// A pre-built document is trusted to be syntactically valid and is never
/// re-parsed.
#[derive(Debug, Clone)]
pub enum QueryInput {
    Text(Option<String>),
    Document(Arc<Document>),
}

impl QueryInput {
    pub fn is_document(&self) -> bool {
        matches!(self, QueryInput::Document(_))
    }
}

impl From<&str> for QueryInput {
    fn from(text: &str) -> Self {
        QueryInput::Text(Some(text.to_string()))
    }
}

impl From<String> for QueryInput {
    fn from(text: String) -> Self {
        QueryInput::Text(Some(text))
    }
}

impl From<Option<String>> for QueryInput {
    fn from(text: Option<String>) -> Self {
        QueryInput::Text(text)
    }
}

impl From<Document> for QueryInput {
    fn from(document: Document) -> Self {
        QueryInput::Document(Arc::new(document))
    }
}

impl From<Arc<Document>> for QueryInput {
    fn from(document: Arc<Document>) -> Self {
        QueryInput::Document(document)
    }
}

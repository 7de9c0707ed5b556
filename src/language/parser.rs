//! Query text -> document

use graphql_parser::query::parse_query;
use regex::Regex;
use std::sync::LazyLock;

use crate::core::{Document, GraphQLError, Source, SourceLocation};

static PARSE_POSITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Parse error at (\d+):(\d+)").expect("parse position pattern is valid")
});

/// Turns labeled query text into a document
///
/// Implementations must report malformed input as a single
/// [`ErrorCategory::Syntax`](crate::core::ErrorCategory::Syntax) error.
pub trait QueryParser: Send + Sync {
    fn parse(&self, source: &Source) -> Result<Document, GraphQLError>;
}

/// Default parser backed by `graphql_parser`
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphQLParser;

impl GraphQLParser {
    pub fn new() -> Self {
        Self
    }
}

impl QueryParser for GraphQLParser {
    fn parse(&self, source: &Source) -> Result<Document, GraphQLError> {
        parse_query::<String>(&source.body)
            .map(|doc| doc.into_static())
            .map_err(|e| syntax_error(&source.name, &e.to_string()))
    }
}

/// Build a syntax error out of a `graphql_parser` message
fn syntax_error(source_name: &str, raw: &str) -> GraphQLError {
    let location = PARSE_POSITION.captures(raw).and_then(|caps| {
        let line = caps[1].parse().ok()?;
        let column = caps[2].parse().ok()?;
        Some(SourceLocation::new(line, column))
    });

    let detail = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("query parse error") && !line.starts_with("Parse error at"))
        .collect::<Vec<_>>()
        .join("; ");
    let detail = if detail.is_empty() {
        raw.trim().to_string()
    } else {
        detail
    };

    GraphQLError::syntax(format!("Syntax Error ({}): {}", source_name, detail), location)
}

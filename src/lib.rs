//! # GraphQL Pipeline
//!
//! The request-execution entry point of a GraphQL engine: given a schema and a
//! query (text or a pre-parsed document), it parses, validates and executes the
//! request and always settles with one [`ExecutionResult`](core::ExecutionResult).
//!
//! ## Features
//!
//! - **Uniform results**: syntax, validation and execution errors share one shape
//! - **Query cost limits**: per-field cost functions fed with the request's variables
//! - **Depth limits**: reject deeply nested operations before they run
//! - **Partial data**: a failing resolver nulls its field, siblings keep their values
//! - **Safe concurrency**: cost rules are bound per call, never mutated in place
//! - **Fault containment**: panics and timeouts become `Internal` errors
//! - **Configuration-Based**: limits and deadlines from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use graphql_pipeline::prelude::*;
//! use serde_json::json;
//!
//! let schema = Schema::builder("Query")
//!     .object(
//!         ObjectType::new("Query").field(
//!             FieldDefinition::new("hello", TypeRef::named("String"))
//!                 .resolve_with(|_| Ok(json!("world"))),
//!         ),
//!     )
//!     .build()?;
//!
//! let result = execute(Arc::new(schema), "{ hello }", None, None, None, None).await;
//! assert_eq!(result.to_json(), json!({ "data": { "hello": "world" } }));
//! ```

pub mod config;
pub mod core;
pub mod execution;
pub mod language;
pub mod pipeline;
pub mod schema;
pub mod validation;

pub use pipeline::execute;
pub use schema::list_internal_directives;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        Document, ErrorCategory, ExecutionResult, Fault, GraphQLError, PathSegment, QueryInput,
        RequestContext, SchemaError, Source, SourceLocation, Variables,
    };

    // === Pipeline ===
    pub use crate::pipeline::{ExecutionRequest, PendingResult, RequestPipeline, execute};

    // === Schema ===
    pub use crate::schema::{
        ArgumentDefinition, Directive, EnumType, FieldDefinition, FieldResolver, ObjectType,
        ResolveInfo, Schema, TypeRef, list_internal_directives,
    };

    // === Collaborators ===
    pub use crate::execution::{DefaultExecutor, ExecutionArgs, Executor};
    pub use crate::language::{GraphQLParser, QueryParser};
    pub use crate::validation::{
        DocumentValidator, QueryComplexity, QueryDepth, ValidationContext, ValidationRule,
    };

    // === Config ===
    pub use crate::config::PipelineConfig;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde_json::Value;
    pub use std::sync::Arc;
}

//! Schema representation consumed by validation and execution
//!
//! The model is intentionally small: object types, enums, the built-in scalars
//! and directives. Fields carry their own resolver and an optional cost
//! function for the query complexity rule.

mod definition;
pub mod directive;
mod field;
mod types;

pub use definition::{Schema, SchemaBuilder};
pub use directive::{Directive, DirectiveLocation, list_internal_directives};
pub use field::{
    ArgumentDefinition, ComplexityFn, FieldDefinition, FieldResolver, FnResolver, ResolveInfo,
};
pub use types::{EnumType, NamedType, ObjectType, ScalarType, TypeRef};

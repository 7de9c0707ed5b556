//! Field definitions, resolvers and cost functions

use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use super::types::TypeRef;
use crate::core::{PathSegment, RequestContext, Variables};

/// Everything a resolver may look at while producing one field value
#[derive(Debug)]
pub struct ResolveInfo<'a> {
    /// Name of the field being resolved (not its alias)
    pub field_name: &'a str,
    /// Object type the field belongs to
    pub parent_type: &'a str,
    /// Value the parent field resolved to (the root value at the top)
    pub parent: &'a Value,
    /// Argument values, with variables and defaults applied
    pub args: &'a Map<String, Value>,
    pub root: &'a Value,
    pub context: &'a RequestContext,
    pub variables: &'a Variables,
    /// Response path of this field
    pub path: &'a [PathSegment],
}

impl ResolveInfo<'_> {
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name).filter(|v| !v.is_null())
    }
}

/// Produces the value of one field
///
/// An `Err` becomes a field error: the field is set to `null` and the error is
/// reported with the field's path, while sibling fields keep their values.
/// Returning a [`GraphQLError`](crate::core::GraphQLError) keeps its message as is.
#[async_trait]
pub trait FieldResolver: Send + Sync {
    async fn resolve(&self, info: &ResolveInfo<'_>) -> Result<Value>;
}

/// Adapter turning a synchronous closure into a [`FieldResolver`]
pub struct FnResolver<F>(F);

impl<F> FnResolver<F>
where
    F: Fn(&ResolveInfo<'_>) -> Result<Value> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> FieldResolver for FnResolver<F>
where
    F: Fn(&ResolveInfo<'_>) -> Result<Value> + Send + Sync,
{
    async fn resolve(&self, info: &ResolveInfo<'_>) -> Result<Value> {
        (self.0)(info)
    }
}

/// Estimated cost of a field given its children's cost and its arguments
pub type ComplexityFn = Arc<dyn Fn(u64, &Map<String, Value>) -> u64 + Send + Sync>;

/// An argument accepted by a field or directive
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDefinition {
    pub name: String,
    pub ty: TypeRef,
    pub description: Option<String>,
    pub default_value: Option<Value>,
}

impl ArgumentDefinition {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
            default_value: None,
        }
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A field of an object type
#[derive(Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub ty: TypeRef,
    pub description: Option<String>,
    pub args: IndexMap<String, ArgumentDefinition>,
    pub resolver: Option<Arc<dyn FieldResolver>>,
    pub complexity: Option<ComplexityFn>,
    pub deprecation_reason: Option<String>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
            args: IndexMap::new(),
            resolver: None,
            complexity: None,
            deprecation_reason: None,
        }
    }

    pub fn argument(mut self, arg: ArgumentDefinition) -> Self {
        self.args.insert(arg.name.clone(), arg);
        self
    }

    /// Resolve with a synchronous closure
    pub fn resolve_with<F>(self, f: F) -> Self
    where
        F: Fn(&ResolveInfo<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.resolver(Arc::new(FnResolver::new(f)))
    }

    pub fn resolver(mut self, resolver: Arc<dyn FieldResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Custom cost estimate used by the query complexity rule
    pub fn complexity<F>(mut self, f: F) -> Self
    where
        F: Fn(u64, &Map<String, Value>) -> u64 + Send + Sync + 'static,
    {
        self.complexity = Some(Arc::new(f));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self, reason: impl Into<String>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation_reason.is_some()
    }

    /// Cost of this field given the cost of its sub-selection
    pub fn cost(&self, children_cost: u64, args: &Map<String, Value>) -> u64 {
        match &self.complexity {
            Some(f) => f(children_cost, args),
            None => children_cost.saturating_add(1),
        }
    }
}

impl fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("args", &self.args)
            .field("has_resolver", &self.resolver.is_some())
            .field("has_complexity", &self.complexity.is_some())
            .field("deprecation_reason", &self.deprecation_reason)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_cost_is_children_plus_one() {
        let field = FieldDefinition::new("name", TypeRef::named("String"));
        assert_eq!(field.cost(0, &Map::new()), 1);
        assert_eq!(field.cost(4, &Map::new()), 5);
    }

    #[test]
    fn test_custom_cost_uses_arguments() {
        let field = FieldDefinition::new("users", TypeRef::list(TypeRef::named("User")))
            .argument(ArgumentDefinition::new("first", TypeRef::named("Int")))
            .complexity(|children, args| {
                let first = args.get("first").and_then(Value::as_u64).unwrap_or(10);
                first * children
            });

        let mut args = Map::new();
        args.insert("first".to_string(), json!(50));
        assert_eq!(field.cost(3, &args), 150);
        assert_eq!(field.cost(3, &Map::new()), 30);
    }

    #[tokio::test]
    async fn test_closure_resolver_reads_parent_and_args() {
        let field = FieldDefinition::new("greeting", TypeRef::named("String")).resolve_with(
            |info| {
                let name = info.parent.get("name").and_then(Value::as_str).unwrap_or("?");
                let punct = info.arg("punct").and_then(Value::as_str).unwrap_or(".");
                Ok(json!(format!("hello {}{}", name, punct)))
            },
        );

        let parent = json!({ "name": "ada" });
        let mut args = Map::new();
        args.insert("punct".to_string(), json!("!"));
        let info = ResolveInfo {
            field_name: "greeting",
            parent_type: "Query",
            parent: &parent,
            args: &args,
            root: &Value::Null,
            context: &RequestContext::empty(),
            variables: &Variables::new(),
            path: &[],
        };

        let resolver = field.resolver.expect("resolver should be set");
        let value = resolver.resolve(&info).await.unwrap();
        assert_eq!(value, json!("hello ada!"));
    }
}

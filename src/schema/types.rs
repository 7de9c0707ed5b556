//! Named types and type references

use graphql_parser::query::Type as AstType;
use indexmap::IndexMap;
use serde_json::{Number, Value};
use std::fmt;

use super::field::FieldDefinition;

/// Reference to a type as written in a field or variable signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    /// `[inner]`
    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    /// `inner!`
    pub fn non_null(inner: TypeRef) -> Self {
        TypeRef::NonNull(Box::new(inner))
    }

    /// `Name!`
    pub fn named_non_null(name: impl Into<String>) -> Self {
        Self::non_null(Self::named(name))
    }

    /// Name of the innermost named type
    pub fn named_type(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.named_type(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    /// Convert a variable type from the query AST
    pub fn from_ast(ty: &AstType<'_, String>) -> Self {
        match ty {
            AstType::NamedType(name) => TypeRef::Named(name.clone()),
            AstType::ListType(inner) => TypeRef::List(Box::new(Self::from_ast(inner))),
            AstType::NonNullType(inner) => TypeRef::NonNull(Box::new(Self::from_ast(inner))),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

/// Built-in scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Int,
    Float,
    String,
    Boolean,
    ID,
}

impl ScalarType {
    pub const ALL: [ScalarType; 5] = [
        ScalarType::Int,
        ScalarType::Float,
        ScalarType::String,
        ScalarType::Boolean,
        ScalarType::ID,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Int => "Int",
            ScalarType::Float => "Float",
            ScalarType::String => "String",
            ScalarType::Boolean => "Boolean",
            ScalarType::ID => "ID",
        }
    }

    /// Check a resolved value against this scalar for output
    ///
    /// Returns `None` when the value cannot represent the scalar.
    pub fn serialize(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (ScalarType::Int, Value::Number(n)) => {
                let i = n.as_i64().or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0)
                        .map(|f| f as i64)
                })?;
                i32::try_from(i).ok().map(Value::from)
            }
            (ScalarType::Int, Value::Bool(b)) => Some(Value::from(*b as i32)),
            (ScalarType::Float, Value::Number(n)) => {
                n.as_f64().and_then(Number::from_f64).map(Value::Number)
            }
            (ScalarType::String, Value::String(_)) => Some(value.clone()),
            (ScalarType::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            (ScalarType::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (ScalarType::Boolean, Value::Bool(_)) => Some(value.clone()),
            (ScalarType::ID, Value::String(_)) => Some(value.clone()),
            (ScalarType::ID, Value::Number(n)) if n.is_i64() || n.is_u64() => {
                Some(Value::String(n.to_string()))
            }
            _ => None,
        }
    }

    /// Check a variable value against this scalar for input
    pub fn coerce_input(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (ScalarType::Int, Value::Number(n)) => n
                .as_i64()
                .and_then(|i| i32::try_from(i).ok())
                .map(Value::from),
            (ScalarType::Float, Value::Number(_)) => Some(value.clone()),
            (ScalarType::String, Value::String(_)) => Some(value.clone()),
            (ScalarType::Boolean, Value::Bool(_)) => Some(value.clone()),
            (ScalarType::ID, Value::String(_)) => Some(value.clone()),
            (ScalarType::ID, Value::Number(n)) if n.is_i64() || n.is_u64() => {
                Some(Value::String(n.to_string()))
            }
            _ => None,
        }
    }
}

/// An enum type: a closed set of names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<String>,
}

impl EnumType {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: None,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

/// An object type with its fields, in declaration order
#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, FieldDefinition>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a field (replacing any field with the same name)
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }
}

/// Any type that can be looked up by name in a schema
#[derive(Debug, Clone)]
pub enum NamedType {
    Scalar(ScalarType),
    Object(ObjectType),
    Enum(EnumType),
}

impl NamedType {
    pub fn name(&self) -> &str {
        match self {
            NamedType::Scalar(scalar) => scalar.name(),
            NamedType::Object(object) => &object.name,
            NamedType::Enum(enum_type) => &enum_type.name,
        }
    }

    /// Scalars and enums have no sub-selection
    pub fn is_leaf(&self) -> bool {
        !matches!(self, NamedType::Object(_))
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            NamedType::Object(object) => Some(object),
            _ => None,
        }
    }
}

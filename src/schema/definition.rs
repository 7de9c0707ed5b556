//! The schema: root types, named types and directives

use indexmap::IndexMap;

use super::directive::{Directive, list_internal_directives};
use super::field::FieldDefinition;
use super::types::{EnumType, NamedType, ObjectType, ScalarType};
use crate::core::SchemaError;

/// A read-only schema shared by every request executed against it
#[derive(Debug, Clone)]
pub struct Schema {
    query_type: String,
    mutation_type: Option<String>,
    types: IndexMap<String, NamedType>,
    directives: IndexMap<String, Directive>,
}

impl Schema {
    /// Start a schema whose query root is the object type `query_type`
    pub fn builder(query_type: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(query_type)
    }

    pub fn query_type(&self) -> &ObjectType {
        self.object(&self.query_type)
            .expect("query root is checked when the schema is built")
    }

    pub fn mutation_type(&self) -> Option<&ObjectType> {
        self.mutation_type.as_deref().and_then(|name| self.object(name))
    }

    pub fn get_type(&self, name: &str) -> Option<&NamedType> {
        self.types.get(name)
    }

    pub fn object(&self, name: &str) -> Option<&ObjectType> {
        self.types.get(name).and_then(NamedType::as_object)
    }

    /// Field `field` of object type `type_name`
    pub fn field(&self, type_name: &str, field: &str) -> Option<&FieldDefinition> {
        self.object(type_name).and_then(|object| object.get_field(field))
    }

    pub fn types(&self) -> impl Iterator<Item = &NamedType> {
        self.types.values()
    }

    pub fn directive(&self, name: &str) -> Option<&Directive> {
        self.directives.get(name)
    }

    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.directives.values()
    }
}

/// Builder for [`Schema`]
#[derive(Debug)]
pub struct SchemaBuilder {
    query_type: String,
    mutation_type: Option<String>,
    types: Vec<NamedType>,
    directives: Vec<Directive>,
}

impl SchemaBuilder {
    pub fn new(query_type: impl Into<String>) -> Self {
        Self {
            query_type: query_type.into(),
            mutation_type: None,
            types: Vec::new(),
            directives: Vec::new(),
        }
    }

    pub fn mutation(mut self, mutation_type: impl Into<String>) -> Self {
        self.mutation_type = Some(mutation_type.into());
        self
    }

    pub fn object(mut self, object: ObjectType) -> Self {
        self.types.push(NamedType::Object(object));
        self
    }

    pub fn enumeration(mut self, enum_type: EnumType) -> Self {
        self.types.push(NamedType::Enum(enum_type));
        self
    }

    /// Register a directive on top of the built-in ones
    pub fn directive(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }

    /// Check every reference and freeze the schema
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut types: IndexMap<String, NamedType> = ScalarType::ALL
            .iter()
            .map(|scalar| (scalar.name().to_string(), NamedType::Scalar(*scalar)))
            .collect();

        for named in self.types {
            let name = named.name().to_string();
            if types.contains_key(&name) {
                return Err(SchemaError::DuplicateType(name));
            }
            types.insert(name, named);
        }

        match types.get(&self.query_type) {
            None => return Err(SchemaError::MissingQueryType(self.query_type)),
            Some(named) if named.as_object().is_none() => {
                return Err(SchemaError::RootNotObject(self.query_type));
            }
            Some(_) => {}
        }

        if let Some(mutation) = &self.mutation_type {
            match types.get(mutation) {
                None => return Err(SchemaError::MissingMutationType(mutation.clone())),
                Some(named) if named.as_object().is_none() => {
                    return Err(SchemaError::RootNotObject(mutation.clone()));
                }
                Some(_) => {}
            }
        }

        for object in types.values().filter_map(NamedType::as_object) {
            for field in object.fields.values() {
                let referenced = std::iter::once(field.ty.named_type())
                    .chain(field.args.values().map(|arg| arg.ty.named_type()));
                for name in referenced {
                    if !types.contains_key(name) {
                        return Err(SchemaError::UnknownType {
                            type_name: object.name.clone(),
                            field: field.name.clone(),
                            referenced: name.to_string(),
                        });
                    }
                }
            }
        }

        let directives = list_internal_directives()
            .into_iter()
            .chain(self.directives)
            .map(|directive| (directive.name.clone(), directive))
            .collect();

        Ok(Schema {
            query_type: self.query_type,
            mutation_type: self.mutation_type,
            types,
            directives,
        })
    }
}

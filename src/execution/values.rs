//! Argument, directive and variable value handling

use graphql_parser::query::{Directive as AstDirective, Value as GqlValue, VariableDefinition};
use serde_json::{Map, Value, json};

use crate::core::{GraphQLError, Variables};
use crate::schema::{FieldDefinition, NamedType, Schema, TypeRef};

/// Convert a GraphQL literal to JSON, substituting variables
///
/// A variable that was not supplied becomes `null`.
pub fn value_to_json(value: &GqlValue<'_, String>, variables: &Variables) -> Value {
    match value {
        GqlValue::Null => Value::Null,
        GqlValue::Int(i) => json!(i.as_i64().unwrap_or(0)),
        GqlValue::Float(f) => json!(f),
        GqlValue::String(s) => json!(s),
        GqlValue::Boolean(b) => json!(b),
        GqlValue::Enum(e) => json!(e),
        GqlValue::List(list) => Value::Array(
            list.iter()
                .map(|item| value_to_json(item, variables))
                .collect(),
        ),
        GqlValue::Object(obj) => {
            let mut map = Map::new();
            for (k, v) in obj {
                map.insert(k.clone(), value_to_json(v, variables));
            }
            Value::Object(map)
        }
        GqlValue::Variable(name) => variables.get(name).cloned().unwrap_or(Value::Null),
    }
}

/// Resolve the argument values of a field
///
/// Arguments that are omitted, or bound to a variable that was not supplied,
/// fall back to the default declared on the field definition.
pub fn argument_values(
    definition: Option<&FieldDefinition>,
    arguments: &[(String, GqlValue<'_, String>)],
    variables: &Variables,
) -> Map<String, Value> {
    let mut values = Map::new();

    for (name, value) in arguments {
        if let GqlValue::Variable(var) = value {
            if !variables.contains_key(var) {
                continue;
            }
        }
        values.insert(name.clone(), value_to_json(value, variables));
    }

    if let Some(definition) = definition {
        for (name, arg) in &definition.args {
            if values.contains_key(name) {
                continue;
            }
            if let Some(default) = &arg.default_value {
                values.insert(name.clone(), default.clone());
            }
        }
    }

    values
}

/// Evaluate `@skip` / `@include` against the request variables
pub fn should_include(directives: &[AstDirective<'_, String>], variables: &Variables) -> bool {
    for directive in directives {
        let condition = directive
            .arguments
            .iter()
            .find(|(name, _)| name == "if")
            .map(|(_, value)| value_to_json(value, variables));

        match (directive.name.as_str(), condition) {
            ("skip", Some(Value::Bool(true))) => return false,
            ("include", Some(Value::Bool(false))) => return false,
            _ => {}
        }
    }
    true
}

/// Supplied variables, completed with the defaults declared by the operation
pub fn with_variable_defaults(
    definitions: &[VariableDefinition<'_, String>],
    provided: &Variables,
) -> Variables {
    let mut values = provided.clone();
    for definition in definitions {
        if values.contains_key(&definition.name) {
            continue;
        }
        if let Some(default) = &definition.default_value {
            values.insert(
                definition.name.clone(),
                value_to_json(default, &Variables::new()),
            );
        }
    }
    values
}

/// Coerce supplied variables against the operation's declared variable types
///
/// Every invalid or missing variable is reported; the returned map only holds
/// variables that have a value (supplied or defaulted).
pub fn coerce_variable_values(
    schema: &Schema,
    definitions: &[VariableDefinition<'_, String>],
    provided: &Variables,
) -> Result<Variables, Vec<GraphQLError>> {
    let mut coerced = Variables::new();
    let mut errors = Vec::new();

    for definition in definitions {
        let ty = TypeRef::from_ast(&definition.var_type);
        let name = &definition.name;

        match provided.get(name) {
            Some(value) => match coerce_input_value(schema, &ty, value) {
                Ok(value) => {
                    coerced.insert(name.clone(), value);
                }
                Err(reason) => errors.push(
                    GraphQLError::execution(format!(
                        "Variable \"${}\" got invalid value {}; {}",
                        name, value, reason
                    ))
                    .at(definition.position),
                ),
            },
            None => {
                if let Some(default) = &definition.default_value {
                    coerced.insert(name.clone(), value_to_json(default, &Variables::new()));
                } else if ty.is_non_null() {
                    errors.push(
                        GraphQLError::execution(format!(
                            "Variable \"${}\" of required type \"{}\" was not provided.",
                            name, ty
                        ))
                        .at(definition.position),
                    );
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(coerced)
    } else {
        Err(errors)
    }
}

/// Coerce one input value to `ty`
fn coerce_input_value(schema: &Schema, ty: &TypeRef, value: &Value) -> Result<Value, String> {
    match ty {
        TypeRef::NonNull(inner) => {
            if value.is_null() {
                return Err(format!("Expected non-nullable type \"{}\" not to be null.", ty));
            }
            coerce_input_value(schema, inner, value)
        }
        _ if value.is_null() => Ok(Value::Null),
        TypeRef::List(inner) => match value {
            Value::Array(items) => items
                .iter()
                .map(|item| coerce_input_value(schema, inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            single => coerce_input_value(schema, inner, single).map(|v| Value::Array(vec![v])),
        },
        TypeRef::Named(name) => match schema.get_type(name) {
            Some(NamedType::Scalar(scalar)) => scalar
                .coerce_input(value)
                .ok_or_else(|| format!("Expected type \"{}\", found {}.", name, value)),
            Some(NamedType::Enum(enum_type)) => match value.as_str() {
                Some(s) if enum_type.contains(s) => Ok(value.clone()),
                _ => Err(format!("Expected type \"{}\", found {}.", name, value)),
            },
            Some(NamedType::Object(_)) => {
                Err(format!("Type \"{}\" is not an input type.", name))
            }
            None => Err(format!("Unknown type \"{}\".", name)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ArgumentDefinition, EnumType, ObjectType};
    use graphql_parser::query::{Definition, OperationDefinition, parse_query};

    fn schema() -> Schema {
        Schema::builder("Query")
            .object(ObjectType::new("Query").field(FieldDefinition::new(
                "hello",
                TypeRef::named("String"),
            )))
            .enumeration(EnumType::new("Color", ["RED", "GREEN"]))
            .build()
            .unwrap()
    }

    fn variable_definitions(query: &str) -> Vec<VariableDefinition<'static, String>> {
        let doc = parse_query::<String>(query).unwrap().into_static();
        match doc.definitions.into_iter().next() {
            Some(Definition::Operation(OperationDefinition::Query(q))) => q.variable_definitions,
            _ => panic!("expected a named query"),
        }
    }

    fn vars(value: Value) -> Variables {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_value_to_json_substitutes_variables() {
        let value = GqlValue::List(vec![
            GqlValue::Variable("a".to_string()),
            GqlValue::Variable("missing".to_string()),
            GqlValue::Enum("RED".to_string()),
        ]);
        assert_eq!(
            value_to_json(&value, &vars(json!({ "a": 5 }))),
            json!([5, null, "RED"])
        );
    }

    #[test]
    fn test_argument_values_apply_defaults() {
        let def = FieldDefinition::new("users", TypeRef::named("String"))
            .argument(ArgumentDefinition::new("first", TypeRef::named("Int")).default_value(json!(10)))
            .argument(ArgumentDefinition::new("after", TypeRef::named("String")));

        let arguments = vec![("after".to_string(), GqlValue::Variable("cursor".to_string()))];

        let args = argument_values(Some(&def), &arguments, &Variables::new());
        assert_eq!(Value::Object(args), json!({ "first": 10 }));

        let args = argument_values(Some(&def), &arguments, &vars(json!({ "cursor": "abc" })));
        assert_eq!(Value::Object(args), json!({ "first": 10, "after": "abc" }));
    }

    #[test]
    fn test_should_include() {
        let doc = parse_query::<String>(
            "query($flag: Boolean!) { a @skip(if: true) b @include(if: $flag) c }",
        )
        .unwrap()
        .into_static();
        let Definition::Operation(OperationDefinition::Query(q)) = &doc.definitions[0] else {
            panic!("expected query");
        };
        let fields: Vec<_> = q
            .selection_set
            .items
            .iter()
            .map(|s| match s {
                graphql_parser::query::Selection::Field(f) => f,
                _ => panic!("expected field"),
            })
            .collect();

        let on = vars(json!({ "flag": true }));
        let off = vars(json!({ "flag": false }));
        assert!(!should_include(&fields[0].directives, &on));
        assert!(should_include(&fields[1].directives, &on));
        assert!(!should_include(&fields[1].directives, &off));
        assert!(should_include(&fields[2].directives, &off));
    }

    #[test]
    fn test_coerce_variables_reports_missing_required() {
        let defs = variable_definitions("query Q($id: ID!, $limit: Int = 5) { hello }");
        let errors = coerce_variable_values(&schema(), &defs, &Variables::new()).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message(),
            "Variable \"$id\" of required type \"ID!\" was not provided."
        );
    }

    #[test]
    fn test_coerce_variables_applies_defaults_and_checks_types() {
        let defs = variable_definitions("query Q($id: ID!, $limit: Int = 5, $c: [Color]) { hello }");

        let coerced =
            coerce_variable_values(&schema(), &defs, &vars(json!({ "id": 7, "c": "RED" })))
                .unwrap();
        assert_eq!(
            Value::Object(coerced),
            json!({ "id": "7", "limit": 5, "c": ["RED"] })
        );

        let errors = coerce_variable_values(
            &schema(),
            &defs,
            &vars(json!({ "id": "1", "limit": "many", "c": ["BLUE"] })),
        )
        .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message().starts_with("Variable \"$limit\" got invalid value"));
    }

    #[test]
    fn test_with_variable_defaults_keeps_supplied_values() {
        let defs = variable_definitions("query Q($a: Int = 1, $b: Int = 2) { hello }");
        let merged = with_variable_defaults(&defs, &vars(json!({ "a": 9 })));
        assert_eq!(Value::Object(merged), json!({ "a": 9, "b": 2 }));
    }
}

//! Document validation
//!
//! A [`DocumentValidator`] is an ordered registry of [`ValidationRule`]s. Rules
//! that need the request's variables (the query cost rule) are never mutated
//! in place: [`DocumentValidator::scoped_for`] hands out a call-scoped rule set
//! where each such rule is replaced by a copy bound to the call's variables.

pub mod rules;
pub mod visitor;

use indexmap::IndexMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::config::PipelineConfig;
use crate::core::{Document, GraphQLError, Variables};
use crate::language::document::FragmentDefinition;
use crate::language::{Operation, fragment_map, operations};
use crate::schema::Schema;

pub use rules::{QueryComplexity, QueryDepth};

/// Everything a rule may inspect
pub struct ValidationContext<'a> {
    pub schema: &'a Schema,
    pub document: &'a Document,
    pub operations: Vec<Operation<'a>>,
    pub fragments: IndexMap<&'a str, &'a FragmentDefinition>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(schema: &'a Schema, document: &'a Document) -> Self {
        Self {
            schema,
            document,
            operations: operations(document),
            fragments: fragment_map(document),
        }
    }
}

/// A check run against (schema, document) before execution
pub trait ValidationRule: Send + Sync {
    /// Registry key of the rule
    fn name(&self) -> &'static str;

    /// Errors found, in detection order
    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<GraphQLError>;

    /// A copy of the rule bound to one request's variables
    ///
    /// Rules that do not look at variables return `None` and are shared as is.
    fn with_variables(&self, _variables: &Variables) -> Option<Arc<dyn ValidationRule>> {
        None
    }
}

static GLOBAL: LazyLock<Arc<DocumentValidator>> =
    LazyLock::new(|| Arc::new(DocumentValidator::with_default_rules()));

/// Ordered registry of validation rules
#[derive(Clone, Default)]
pub struct DocumentValidator {
    rules: IndexMap<&'static str, Arc<dyn ValidationRule>>,
}

impl DocumentValidator {
    /// A validator without any rule
    pub fn new() -> Self {
        Self::default()
    }

    /// The full default rule set; the cost and depth limits are disabled
    pub fn with_default_rules() -> Self {
        let mut validator = Self::new();
        for rule in rules::default_rules() {
            validator.add_rule(rule);
        }
        validator
    }

    /// The default rule set with limits taken from `config`
    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut validator = Self::with_default_rules();
        validator.add_rule(Arc::new(QueryComplexity::new(config.max_query_complexity)));
        validator.add_rule(Arc::new(QueryDepth::new(config.max_query_depth)));
        validator
    }

    /// Process-wide default validator, built once on first use
    pub fn global() -> Arc<DocumentValidator> {
        GLOBAL.clone()
    }

    /// Register a rule; a rule with the same name keeps its position and is replaced
    pub fn add_rule(&mut self, rule: Arc<dyn ValidationRule>) {
        self.rules.insert(rule.name(), rule);
    }

    pub fn remove_rule(&mut self, name: &str) -> Option<Arc<dyn ValidationRule>> {
        self.rules.shift_remove(name)
    }

    pub fn get_rule(&self, name: &str) -> Option<&Arc<dyn ValidationRule>> {
        self.rules.get(name)
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.keys().copied()
    }

    /// Call-scoped copy of this validator, bound to `variables`
    ///
    /// Shared rules are reused; rules that depend on variables are cloned with
    /// the given values. `self` is left untouched, so concurrent requests
    /// cannot see each other's variables.
    pub fn scoped_for(&self, variables: &Variables) -> DocumentValidator {
        let rules = self
            .rules
            .iter()
            .map(|(name, rule)| {
                let scoped = rule.with_variables(variables).unwrap_or_else(|| rule.clone());
                (*name, scoped)
            })
            .collect();
        DocumentValidator { rules }
    }

    /// Run every rule; an empty result means the document is valid
    pub fn validate(&self, schema: &Schema, document: &Document) -> Vec<GraphQLError> {
        let ctx = ValidationContext::new(schema, document);
        self.rules
            .values()
            .flat_map(|rule| rule.validate(&ctx))
            .collect()
    }
}

impl fmt::Debug for DocumentValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentValidator")
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Source;
    use crate::language::{GraphQLParser, QueryParser};
    use crate::schema::{FieldDefinition, ObjectType, TypeRef};
    use serde_json::json;

    fn schema() -> Schema {
        Schema::builder("Query")
            .object(
                ObjectType::new("Query")
                    .field(FieldDefinition::new("hello", TypeRef::named("String")))
                    .field(
                        FieldDefinition::new("items", TypeRef::list(TypeRef::named("String")))
                            .complexity(|children, args| {
                                args.get("n").and_then(|v| v.as_u64()).unwrap_or(1) * (children + 1)
                            }),
                    ),
            )
            .build()
            .unwrap()
    }

    fn parse(text: &str) -> Document {
        GraphQLParser::new().parse(&Source::new(text, "test")).unwrap()
    }

    #[test]
    fn test_default_rules_are_registered_in_order() {
        let validator = DocumentValidator::with_default_rules();
        let names: Vec<_> = validator.rule_names().collect();

        assert_eq!(names.first(), Some(&"UniqueOperationNames"));
        assert!(names.contains(&QueryComplexity::NAME));
        assert!(validator.get_rule("QueryDepth").is_some());
        assert!(validator.get_rule("Nope").is_none());
    }

    #[test]
    fn test_add_rule_replaces_in_place() {
        let mut validator = DocumentValidator::with_default_rules();
        let before: Vec<_> = validator.rule_names().collect();

        validator.add_rule(Arc::new(QueryComplexity::new(5)));
        let after: Vec<_> = validator.rule_names().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_valid_document_has_no_errors() {
        let validator = DocumentValidator::with_default_rules();
        assert!(validator.validate(&schema(), &parse("{ hello }")).is_empty());
    }

    #[test]
    fn test_errors_keep_detection_order() {
        let validator = DocumentValidator::with_default_rules();
        let errors = validator.validate(&schema(), &parse("query A { nope } query A { hello }"));

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message(), "There can be only one operation named \"A\".");
        assert_eq!(errors[1].message(), "Cannot query field \"nope\" on type \"Query\".");
    }

    #[test]
    fn test_scoped_validator_does_not_touch_shared_rules() {
        let shared = DocumentValidator::from_config(&PipelineConfig::default().with_max_query_complexity(10));
        let document = parse("query Q($n: Int) { items(n: $n) }");

        let mut heavy = Variables::new();
        heavy.insert("n".to_string(), json!(100));
        let mut light = Variables::new();
        light.insert("n".to_string(), json!(2));

        let heavy_errors = shared.scoped_for(&heavy).validate(&schema(), &document);
        let light_errors = shared.scoped_for(&light).validate(&schema(), &document);

        assert_eq!(heavy_errors.len(), 1);
        assert!(light_errors.is_empty());
        // the shared instance was never bound to any variables
        assert!(shared.validate(&schema(), &document).is_empty());
    }
}

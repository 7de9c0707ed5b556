//! Directive definitions and the built-in directive catalog

use indexmap::IndexMap;
use serde_json::json;
use std::fmt;
use std::sync::LazyLock;

use super::field::ArgumentDefinition;
use super::types::TypeRef;

/// Reason reported for `@deprecated` without an explicit one
pub const DEFAULT_DEPRECATION_REASON: &str = "No longer supported";

/// Where a directive may appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    FieldDefinition,
    EnumValue,
}

impl DirectiveLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectiveLocation::Query => "QUERY",
            DirectiveLocation::Mutation => "MUTATION",
            DirectiveLocation::Subscription => "SUBSCRIPTION",
            DirectiveLocation::Field => "FIELD",
            DirectiveLocation::FragmentDefinition => "FRAGMENT_DEFINITION",
            DirectiveLocation::FragmentSpread => "FRAGMENT_SPREAD",
            DirectiveLocation::InlineFragment => "INLINE_FRAGMENT",
            DirectiveLocation::FieldDefinition => "FIELD_DEFINITION",
            DirectiveLocation::EnumValue => "ENUM_VALUE",
        }
    }
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directive definition
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: String,
    pub description: Option<String>,
    pub locations: Vec<DirectiveLocation>,
    pub args: Vec<ArgumentDefinition>,
}

impl Directive {
    pub fn new(name: impl Into<String>, locations: Vec<DirectiveLocation>) -> Self {
        Self {
            name: name.into(),
            description: None,
            locations,
            args: Vec::new(),
        }
    }

    pub fn argument(mut self, arg: ArgumentDefinition) -> Self {
        self.args.push(arg);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// `@include(if: Boolean!)`
    pub fn include() -> Self {
        Self::new(
            "include",
            vec![
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
        )
        .description(
            "Directs the executor to include this field or fragment only when the `if` argument is true.",
        )
        .argument(
            ArgumentDefinition::new("if", TypeRef::named_non_null("Boolean"))
                .description("Included when true."),
        )
    }

    /// `@skip(if: Boolean!)`
    pub fn skip() -> Self {
        Self::new(
            "skip",
            vec![
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
        )
        .description(
            "Directs the executor to skip this field or fragment when the `if` argument is true.",
        )
        .argument(
            ArgumentDefinition::new("if", TypeRef::named_non_null("Boolean"))
                .description("Skipped when true."),
        )
    }

    /// `@deprecated(reason: String = "No longer supported")`
    pub fn deprecated() -> Self {
        Self::new(
            "deprecated",
            vec![DirectiveLocation::FieldDefinition, DirectiveLocation::EnumValue],
        )
        .description("Marks an element of a GraphQL schema as no longer supported.")
        .argument(
            ArgumentDefinition::new("reason", TypeRef::named("String"))
                .default_value(json!(DEFAULT_DEPRECATION_REASON)),
        )
    }

    /// Whether `name` is one of the built-in directives
    pub fn is_internal(name: &str) -> bool {
        INTERNAL_DIRECTIVES.contains_key(name)
    }
}

static INTERNAL_DIRECTIVES: LazyLock<IndexMap<&'static str, Directive>> = LazyLock::new(|| {
    IndexMap::from([
        ("include", Directive::include()),
        ("skip", Directive::skip()),
        ("deprecated", Directive::deprecated()),
    ])
});

/// The schema-independent built-in directives, in registry order
pub fn list_internal_directives() -> Vec<Directive> {
    INTERNAL_DIRECTIVES.values().cloned().collect()
}

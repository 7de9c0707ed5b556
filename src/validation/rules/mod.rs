//! Built-in validation rules

mod fields;
mod fragments;
mod operations;
mod query_complexity;
mod query_depth;
mod variables;

use std::sync::Arc;

use super::ValidationRule;

pub use fields::{FieldsOnCorrectType, KnownArgumentNames, ProvidedRequiredArguments, ScalarLeafs};
pub use fragments::{KnownFragmentNames, NoFragmentCycles, NoUnusedFragments};
pub use operations::{LoneAnonymousOperation, UniqueOperationNames};
pub use query_complexity::QueryComplexity;
pub use query_depth::QueryDepth;
pub use variables::{NoUndefinedVariables, NoUnusedVariables};

/// The default rule set, in the order rules run
pub fn default_rules() -> Vec<Arc<dyn ValidationRule>> {
    vec![
        Arc::new(UniqueOperationNames),
        Arc::new(LoneAnonymousOperation),
        Arc::new(KnownFragmentNames),
        Arc::new(NoUnusedFragments),
        Arc::new(NoFragmentCycles),
        Arc::new(FieldsOnCorrectType),
        Arc::new(ScalarLeafs),
        Arc::new(KnownArgumentNames),
        Arc::new(ProvidedRequiredArguments),
        Arc::new(NoUndefinedVariables),
        Arc::new(NoUnusedVariables),
        Arc::new(QueryDepth::new(0)),
        Arc::new(QueryComplexity::new(0)),
    ]
}

//! GraphQL execution
//!
//! The executor is split into several sub-modules:
//! - `executor`: the [`Executor`] seam and the default orchestration
//! - `field_resolver`: field collection, resolution and value completion
//! - `values`: argument, directive and variable value handling

mod executor;
mod field_resolver;
pub mod values;

pub use executor::{DefaultExecutor, ExecutionArgs, Executor};

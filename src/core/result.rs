//! The single output type of a request

use serde::Serialize;
use serde_json::Value;

use super::error::{Fault, GraphQLError};

/// Outcome of one request
///
/// `data` is `None` whenever a blocking error happened before execution
/// (syntax, validation, request errors, faults). Once the execution stage is
/// reached, `data` and `errors` may coexist as a partial result.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ExecutionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
}

impl ExecutionResult {
    pub fn new(data: Option<Value>, errors: Vec<GraphQLError>) -> Self {
        Self { data, errors }
    }

    /// A successful result carrying `data` and no errors
    pub fn from_data(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// A blocking failure: `data` stays unset
    pub fn from_errors(errors: Vec<GraphQLError>) -> Self {
        Self { data: None, errors }
    }

    pub fn from_error(error: GraphQLError) -> Self {
        Self::from_errors(vec![error])
    }

    /// Normalize an unanticipated fault into a single `Internal` error
    pub fn from_fault(fault: Fault) -> Self {
        Self::from_error(fault.into())
    }

    /// True when no error of any kind was reported
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// True when the result came out of the boundary safety net
    pub fn has_internal_fault(&self) -> bool {
        self.errors.iter().any(GraphQLError::is_internal)
    }

    /// Serialize to the conventional `{data, errors}` wire shape
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({ "errors": [{ "message": e.to_string() }] })
        })
    }
}

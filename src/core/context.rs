//! Request-scoped values handed to resolvers

use serde_json::{Map, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Raw variable values supplied with a request (name -> value)
pub type Variables = Map<String, Value>;

/// Opaque, request-scoped context value
///
/// The pipeline never looks inside; resolvers downcast it to whatever the
/// caller put in. Mutation is up to the stored type (e.g. a `Mutex` field).
#[derive(Clone, Default)]
pub struct RequestContext {
    inner: Option<Arc<dyn Any + Send + Sync>>,
}

impl RequestContext {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Some(Arc::new(value)),
        }
    }

    pub fn from_arc(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self { inner: Some(value) }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    /// Borrow the stored value as `T`, if that is what it holds
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.inner.as_deref().and_then(|v| v.downcast_ref::<T>())
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("is_set", &self.inner.is_some())
            .finish()
    }
}

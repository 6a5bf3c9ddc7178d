//! Typed injection resources
//!
//! Contributor method parameters are resolved from a `TypeId`-keyed resource
//! pool at build time, not at invocation time. The pool is seeded by the
//! surrounding registry with itself and a per-service diagnostic logger.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

/// Shared, type-erased resource value
pub type Resource = Arc<dyn Any + Send + Sync>;

/// A formal-parameter request: the resource type plus a readable name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRequest {
    type_id: TypeId,
    type_name: &'static str,
}

impl ResourceRequest {
    /// Request a resource of type `T`
    pub fn of<T: Any + Send + Sync>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    /// Readable name of the requested type, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }
}

/// `TypeId`-keyed pool of injection resources
#[derive(Default, Clone)]
pub struct ResourceMap {
    entries: FxHashMap<TypeId, Resource>,
}

impl ResourceMap {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide a resource instance under its concrete type
    pub fn provide<T: Any + Send + Sync>(&mut self, value: T) -> &mut Self {
        self.entries.insert(TypeId::of::<T>(), Arc::new(value));
        self
    }

    /// Provide an already-shared resource under its concrete type
    pub fn provide_shared<T: Any + Send + Sync>(&mut self, value: Arc<T>) -> &mut Self {
        self.entries.insert(TypeId::of::<T>(), value);
        self
    }

    /// Look up a typed resource
    pub fn find<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.entries
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|resource| resource.downcast::<T>().ok())
    }

    /// Look up a type-erased resource by request
    pub(crate) fn find_raw(&self, request: &ResourceRequest) -> Option<Resource> {
        self.entries.get(&request.type_id()).cloned()
    }

    /// Number of provided resources
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ResourceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceMap")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Per-service diagnostic logger seeded into the resource pool.
///
/// Contributor methods that declare a logger parameter receive one tagged
/// with the service id they are contributing to.
#[derive(Debug, Clone)]
pub struct ServiceLogger {
    service_id: String,
}

impl ServiceLogger {
    /// Logger for the named service
    pub fn new(service_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
        }
    }

    /// The service this logger is tagged with
    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Emit a debug-level diagnostic tagged with the service id
    pub fn debug(&self, message: &str) {
        log::debug!("[{}] {}", self.service_id, message);
    }

    /// Emit a trace-level diagnostic tagged with the service id
    pub fn trace(&self, message: &str) {
        log::trace!("[{}] {}", self.service_id, message);
    }
}

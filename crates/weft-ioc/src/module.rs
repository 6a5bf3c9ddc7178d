//! Module builder source
//!
//! Non-static contributor methods are invoked against their owning module
//! builder instance. The instance is created at most once per module and
//! shared across every contribution built from it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Supplies the module builder instance owning contributor methods
pub trait ModuleBuilderSource: Send + Sync {
    /// The module builder instance, created on first use
    fn module_builder(&self) -> Arc<dyn Any + Send + Sync>;
}

/// Instantiate-once module source
pub struct LazyModuleSource {
    constructor: Box<dyn Fn() -> Arc<dyn Any + Send + Sync> + Send + Sync>,
    instance: Mutex<Option<Arc<dyn Any + Send + Sync>>>,
}

impl LazyModuleSource {
    /// Source that builds the module instance on first request
    pub fn new<F>(constructor: F) -> Self
    where
        F: Fn() -> Arc<dyn Any + Send + Sync> + Send + Sync + 'static,
    {
        Self {
            constructor: Box::new(constructor),
            instance: Mutex::new(None),
        }
    }
}

impl ModuleBuilderSource for LazyModuleSource {
    fn module_builder(&self) -> Arc<dyn Any + Send + Sync> {
        let mut slot = self.instance.lock();
        slot.get_or_insert_with(|| (self.constructor)()).clone()
    }
}

impl fmt::Debug for LazyModuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyModuleSource")
            .field("instantiated", &self.instance.lock().is_some())
            .finish()
    }
}

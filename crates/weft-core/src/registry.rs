//! Component class registry
//!
//! Classes are woven exactly once, at registration time, parents before
//! children. The registry serves woven classes and their behavioral models
//! by name.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::model::{ComponentClass, MutableComponentModel};
use crate::weaver::RenderPhaseWeaver;
use crate::{WeaveError, WeaveResult};

/// Registry of woven component classes
pub struct ComponentClassRegistry {
    weaver: RenderPhaseWeaver,
    classes: FxHashMap<String, Arc<ComponentClass>>,
    models: FxHashMap<String, MutableComponentModel>,
}

impl Default for ComponentClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentClassRegistry {
    /// Registry using the default weaver
    pub fn new() -> Self {
        Self::with_weaver(RenderPhaseWeaver::new())
    }

    /// Registry using a preconfigured weaver
    pub fn with_weaver(weaver: RenderPhaseWeaver) -> Self {
        Self {
            weaver,
            classes: FxHashMap::default(),
            models: FxHashMap::default(),
        }
    }

    /// Weave and register a class, returning the shared handle.
    ///
    /// Parent linkage is established via [`ComponentClass::with_parent`]
    /// using a handle returned by an earlier registration, so parents are
    /// always woven before their children.
    pub fn register(&mut self, mut class: ComponentClass) -> WeaveResult<Arc<ComponentClass>> {
        if self.classes.contains_key(class.name()) {
            return Err(WeaveError::DuplicateClass(class.name().to_string()));
        }

        let mut model = MutableComponentModel::new(class.name());
        self.weaver.weave(&mut class, &mut model)?;

        log::trace!(
            "registered component class {} handling {} phase(s)",
            class.name(),
            model.handled_phases().len()
        );

        let name = class.name().to_string();
        let class = Arc::new(class);
        self.models.insert(name.clone(), model);
        self.classes.insert(name, class.clone());
        Ok(class)
    }

    /// Look up a woven class by name
    pub fn get(&self, name: &str) -> Option<&Arc<ComponentClass>> {
        self.classes.get(name)
    }

    /// Look up a class's behavioral model by name
    pub fn model(&self, name: &str) -> Option<&MutableComponentModel> {
        self.models.get(name)
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

//! Component class and method metadata
//!
//! The weaver's view of a component class: its declared methods in
//! declaration order, its parent class, and the dispatch routines woven onto
//! it. `MethodInfo` stands in for reflective method access: each declared
//! method carries its parameter shape plus a callable body.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::dispatch::DispatchRoutine;
use crate::event::RenderValue;
use crate::phase::RenderPhase;
use crate::writer::MarkupWriter;
use crate::BoxError;

/// Callable body of a declared method.
///
/// The instance is the component's state, the writer argument is present only
/// for methods declared with a writer parameter, and a `Some` return value is
/// posted to the render event.
pub type MethodBody = Arc<
    dyn Fn(&mut dyn Any, Option<&mut dyn MarkupWriter>) -> Result<Option<RenderValue>, BoxError>
        + Send
        + Sync,
>;

/// Kind of a declared formal parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// The markup writer abstraction
    MarkupWriter,
    /// The render event abstraction
    Event,
    /// Any other parameter type, by name
    Other(String),
}

/// Metadata for a single method declared directly on a component class
#[derive(Clone)]
pub struct MethodInfo {
    name: String,
    phase_tag: Option<RenderPhase>,
    params: Vec<ParamKind>,
    is_override: bool,
    body: MethodBody,
}

impl MethodInfo {
    /// A method with no parameters and no explicit phase tag.
    ///
    /// A body returning `Some` models a non-void method; the value is posted
    /// to the render event.
    pub fn new(name: impl Into<String>, body: MethodBody) -> Self {
        Self {
            name: name.into(),
            phase_tag: None,
            params: Vec::new(),
            is_override: false,
            body,
        }
    }

    /// Tag the method with an explicit render phase
    pub fn with_phase_tag(mut self, phase: RenderPhase) -> Self {
        self.phase_tag = Some(phase);
        self
    }

    /// Declare the method's formal parameters
    pub fn with_params(mut self, params: Vec<ParamKind>) -> Self {
        self.params = params;
        self
    }

    /// Mark the method as an override of an inherited method
    pub fn as_override(mut self) -> Self {
        self.is_override = true;
        self
    }

    /// Declared method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit phase tag, if any
    pub fn phase_tag(&self) -> Option<RenderPhase> {
        self.phase_tag
    }

    /// Declared formal parameters
    pub fn params(&self) -> &[ParamKind] {
        &self.params
    }

    /// Whether the method overrides an inherited method
    pub fn is_override(&self) -> bool {
        self.is_override
    }

    /// Whether the method takes the markup writer as its single parameter
    pub fn takes_writer(&self) -> bool {
        self.params == [ParamKind::MarkupWriter]
    }

    /// Whether the method has the shape of a synthesized lifecycle dispatch
    /// method (writer plus event). Such methods belong to a superclass's
    /// dispatch and are never phase-matched.
    pub fn has_lifecycle_signature(&self) -> bool {
        self.params == [ParamKind::MarkupWriter, ParamKind::Event]
    }

    /// Shared handle to the callable body
    pub fn body(&self) -> MethodBody {
        self.body.clone()
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("name", &self.name)
            .field("phase_tag", &self.phase_tag)
            .field("params", &self.params)
            .field("is_override", &self.is_override)
            .finish()
    }
}

/// A component class as seen by the weaver
pub struct ComponentClass {
    /// Fully-qualified class name
    name: String,
    /// Parent component class, woven before this one
    parent: Option<Arc<ComponentClass>>,
    /// Declared methods in declaration order
    methods: Vec<MethodInfo>,
    /// Dispatch routines woven per phase
    dispatch: FxHashMap<RenderPhase, Arc<DispatchRoutine>>,
    /// Set once the weaver has processed this class
    woven: bool,
}

impl ComponentClass {
    /// Create a root component class
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            methods: Vec::new(),
            dispatch: FxHashMap::default(),
            woven: false,
        }
    }

    /// Create a component class extending `parent`
    pub fn with_parent(name: impl Into<String>, parent: Arc<ComponentClass>) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent),
            methods: Vec::new(),
            dispatch: FxHashMap::default(),
            woven: false,
        }
    }

    /// Append a declared method, preserving declaration order
    pub fn add_method(&mut self, method: MethodInfo) -> &mut Self {
        self.methods.push(method);
        self
    }

    /// Fully-qualified class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent class, if any
    pub fn parent(&self) -> Option<&Arc<ComponentClass>> {
        self.parent.as_ref()
    }

    /// Declared methods in declaration order
    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    /// The dispatch routine serving `phase` for this class.
    ///
    /// Falls back to the parent chain when this class has no local routine,
    /// mirroring virtual method inheritance.
    pub fn dispatch_routine(&self, phase: RenderPhase) -> Option<Arc<DispatchRoutine>> {
        self.dispatch.get(&phase).cloned().or_else(|| {
            self.parent
                .as_ref()
                .and_then(|parent| parent.dispatch_routine(phase))
        })
    }

    /// Whether the weaver has already processed this class
    pub fn is_woven(&self) -> bool {
        self.woven
    }

    pub(crate) fn install_routine(&mut self, phase: RenderPhase, routine: Arc<DispatchRoutine>) {
        self.dispatch.insert(phase, routine);
    }

    pub(crate) fn mark_woven(&mut self) {
        self.woven = true;
    }
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentClass")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("methods", &self.methods.len())
            .field("woven_phases", &self.dispatch.len())
            .field("woven", &self.woven)
            .finish()
    }
}

/// Behavioral model mutated during class transformation.
///
/// Records which render phases the class participates in; downstream
/// consumers use this to know which phases actually produce output.
#[derive(Debug)]
pub struct MutableComponentModel {
    component_class_name: String,
    handled_phases: Vec<RenderPhase>,
}

impl MutableComponentModel {
    /// Fresh model for the named component class
    pub fn new(component_class_name: impl Into<String>) -> Self {
        Self {
            component_class_name: component_class_name.into(),
            handled_phases: Vec::new(),
        }
    }

    /// Name of the component class this model describes
    pub fn component_class_name(&self) -> &str {
        &self.component_class_name
    }

    /// Record that the class participates in `phase`
    pub fn add_render_phase(&mut self, phase: RenderPhase) {
        if !self.handled_phases.contains(&phase) {
            self.handled_phases.push(phase);
        }
    }

    /// Whether the class participates in `phase`
    pub fn handles_phase(&self, phase: RenderPhase) -> bool {
        self.handled_phases.contains(&phase)
    }

    /// Phases the class participates in, in discovery order
    pub fn handled_phases(&self) -> &[RenderPhase] {
        &self.handled_phases
    }
}

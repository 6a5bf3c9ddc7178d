//! Weft component framework core
//!
//! Load-time transformation that turns a component class's declared methods
//! into per-phase render dispatch routines:
//! - Render phase metadata (eight lifecycle stages, ordering semantics)
//! - Component class and method metadata model
//! - Dispatch routine composition (delegate chains)
//! - The render-phase method weaver and the class registry driving it
//!
//! Rendering itself, templates, and markup output are external concerns;
//! this crate only composes the dispatch behavior a renderer invokes.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod dispatch;
pub mod event;
pub mod model;
pub mod phase;
pub mod registry;
pub mod weaver;
pub mod writer;

pub use dispatch::{ChainAssembler, DispatchAssembler, DispatchPlan, DispatchRoutine, Invoker};
pub use event::{BasicRenderEvent, Event, RenderValue};
pub use model::{ComponentClass, MethodBody, MethodInfo, MutableComponentModel, ParamKind};
pub use phase::RenderPhase;
pub use registry::ComponentClassRegistry;
pub use weaver::RenderPhaseWeaver;
pub use writer::{MarkupWriter, MemoryWriter};

/// Boxed error produced by a method body
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while weaving render-phase dispatch onto a component class
#[derive(Debug, thiserror::Error)]
pub enum WeaveError {
    /// A method matched a render phase but has an unsupported parameter shape
    #[error("Method {method} is not a valid render phase method: it should take no parameters, or take a single parameter of type MarkupWriter")]
    InvalidRenderPhaseMethod {
        /// Fully-qualified identifier of the offending method
        method: String,
    },

    /// A class was registered under a name that is already taken
    #[error("Component class {0} is already registered")]
    DuplicateClass(String),
}

/// Weaving result
pub type WeaveResult<T> = Result<T, WeaveError>;

/// Errors raised while executing a woven dispatch routine
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// A render phase method returned an error
    #[error("Render phase method {method} failed: {source}")]
    MethodFailed {
        /// Fully-qualified identifier of the failing method
        method: String,
        /// The underlying failure
        #[source]
        source: BoxError,
    },
}

/// Dispatch result
pub type DispatchResult<T> = Result<T, DispatchError>;

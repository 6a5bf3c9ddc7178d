//! Render event abstraction
//!
//! Dispatch routines consult the event after every method invocation to
//! decide whether to keep going: an aborted event stops the phase, and a
//! stored return value that the event accepts as terminal does the same.

use std::any::Any;

/// Opaque value returned by a render phase method
pub type RenderValue = Box<dyn Any + Send>;

/// The render event consulted by dispatch routines
pub trait Event {
    /// Whether the current phase has been aborted
    fn is_aborted(&self) -> bool;

    /// Record the fully-qualified identifier of the method about to run
    fn set_method_description(&mut self, description: &str);

    /// Post a method's return value to the event.
    ///
    /// Returns true when the value was accepted as terminal, in which case
    /// dispatch stops immediately.
    fn store_result(&mut self, value: RenderValue) -> bool;
}

/// Basic event implementation used by the render pipeline and tests.
///
/// Accepting a result aborts the phase: once a return value is stored, no
/// further methods in the phase run.
#[derive(Default)]
pub struct BasicRenderEvent {
    aborted: bool,
    method_description: Option<String>,
    result: Option<RenderValue>,
}

impl BasicRenderEvent {
    /// Create a fresh event
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier of the last method handed to a dispatch routine
    pub fn method_description(&self) -> Option<&str> {
        self.method_description.as_deref()
    }

    /// The stored terminal result, if any
    pub fn result(&self) -> Option<&RenderValue> {
        self.result.as_ref()
    }

    /// Force the aborted flag, halting any in-flight dispatch
    pub fn abort(&mut self) {
        self.aborted = true;
    }
}

impl Event for BasicRenderEvent {
    fn is_aborted(&self) -> bool {
        self.aborted
    }

    fn set_method_description(&mut self, description: &str) {
        self.method_description = Some(description.to_string());
    }

    fn store_result(&mut self, value: RenderValue) -> bool {
        self.result = Some(value);
        self.aborted = true;
        true
    }
}

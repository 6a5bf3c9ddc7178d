//! Dispatch routine composition
//!
//! A woven render phase is a delegate chain: the phase's matched methods in
//! execution order, plus an optional superclass routine positioned by the
//! phase's ordering semantics. The `DispatchAssembler` trait is the seam
//! standing in for physical code synthesis; the delegate-chain backend is the
//! only implementation.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::event::Event;
use crate::model::MethodBody;
use crate::phase::RenderPhase;
use crate::writer::MarkupWriter;
use crate::{DispatchError, DispatchResult};

/// A single render phase method, bound and ready to invoke
pub struct Invoker {
    /// Fully-qualified method identifier, e.g. `app::pages::Index.begin_render`
    method_id: String,
    /// Whether the method takes the markup writer
    takes_writer: bool,
    body: MethodBody,
}

impl Invoker {
    pub(crate) fn new(method_id: String, takes_writer: bool, body: MethodBody) -> Self {
        Self {
            method_id,
            takes_writer,
            body,
        }
    }

    /// Fully-qualified identifier of the bound method
    pub fn method_id(&self) -> &str {
        &self.method_id
    }

    /// Invoke the bound method against `instance`.
    ///
    /// The event is told which method is about to run; a returned value is
    /// posted to the event. Returns true when the event accepted the value
    /// as terminal.
    fn invoke(
        &self,
        instance: &mut dyn Any,
        writer: &mut dyn MarkupWriter,
        event: &mut dyn Event,
    ) -> DispatchResult<bool> {
        event.set_method_description(&self.method_id);

        let writer_arg: Option<&mut dyn MarkupWriter> = if self.takes_writer {
            Some(writer)
        } else {
            None
        };

        let returned = (self.body)(instance, writer_arg).map_err(|source| {
            DispatchError::MethodFailed {
                method: self.method_id.clone(),
                source,
            }
        })?;

        match returned {
            Some(value) => Ok(event.store_result(value)),
            None => Ok(false),
        }
    }
}

impl fmt::Debug for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invoker")
            .field("method_id", &self.method_id)
            .field("takes_writer", &self.takes_writer)
            .finish()
    }
}

/// Everything the assembler needs to compose one phase's routine
pub struct DispatchPlan {
    /// The phase being composed
    pub phase: RenderPhase,
    /// Matched invokers in declaration order
    pub invokers: Vec<Invoker>,
    /// The superclass routine for the same phase; `None` when this class is
    /// the root contributor to the phase
    pub super_routine: Option<Arc<DispatchRoutine>>,
}

/// Composition backend standing in for bytecode synthesis.
///
/// Given the phase, the ordered method list, and the superclass routine, the
/// assembler produces the callable dispatch routine. The seam keeps the
/// weaver independent of how routines are physically composed.
pub trait DispatchAssembler {
    /// Compose a dispatch routine from a plan
    fn assemble(&self, plan: DispatchPlan) -> Arc<DispatchRoutine>;
}

/// Delegate-chain assembler, the default backend
#[derive(Debug, Default)]
pub struct ChainAssembler;

impl DispatchAssembler for ChainAssembler {
    fn assemble(&self, plan: DispatchPlan) -> Arc<DispatchRoutine> {
        let DispatchPlan {
            phase,
            mut invokers,
            super_routine,
        } = plan;

        if phase.is_reverse() {
            invokers.reverse();
        }

        Arc::new(DispatchRoutine {
            phase,
            invokers,
            super_routine,
        })
    }
}

/// A composed per-phase dispatch routine
pub struct DispatchRoutine {
    phase: RenderPhase,
    /// Invokers in execution order (already reversed for reverse phases)
    invokers: Vec<Invoker>,
    super_routine: Option<Arc<DispatchRoutine>>,
}

impl DispatchRoutine {
    /// The phase this routine serves
    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    /// Identifiers of the bound methods, in execution order
    pub fn method_ids(&self) -> Vec<&str> {
        self.invokers.iter().map(|i| i.method_id()).collect()
    }

    /// Run the phase against a component instance.
    ///
    /// Forward phases run the superclass routine first and skip local methods
    /// when it aborts; reverse phases run it last. A terminal result or an
    /// abort stops dispatch immediately, including any pending superclass
    /// call.
    pub fn dispatch(
        &self,
        instance: &mut dyn Any,
        writer: &mut dyn MarkupWriter,
        event: &mut dyn Event,
    ) -> DispatchResult<()> {
        if !self.phase.is_reverse() {
            if let Some(parent) = &self.super_routine {
                parent.dispatch(instance, writer, event)?;
                if event.is_aborted() {
                    return Ok(());
                }
            }
        }

        for invoker in &self.invokers {
            if invoker.invoke(instance, writer, event)? {
                return Ok(());
            }
            if event.is_aborted() {
                return Ok(());
            }
        }

        if self.phase.is_reverse() {
            if let Some(parent) = &self.super_routine {
                parent.dispatch(instance, writer, event)?;
            }
        }

        Ok(())
    }
}

impl fmt::Debug for DispatchRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchRoutine")
            .field("phase", &self.phase)
            .field("invokers", &self.invokers)
            .field("has_super", &self.super_routine.is_some())
            .finish()
    }
}

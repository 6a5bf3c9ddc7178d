//! Render phase method weaver
//!
//! Load-time transformation that categorizes a class's declared methods into
//! render phases (by explicit tag or conventional name), validates their
//! shapes, and composes one dispatch routine per matched phase.

use rustc_hash::FxHashMap;

use crate::dispatch::{ChainAssembler, DispatchAssembler, DispatchPlan, Invoker};
use crate::model::{ComponentClass, MethodInfo, MutableComponentModel, ParamKind};
use crate::phase::RenderPhase;
use crate::{WeaveError, WeaveResult};

/// Weaves render-phase dispatch onto component classes.
///
/// Runs once per class, at class-preparation time. Methods that match no
/// phase are left untouched; matched methods with an unsupported parameter
/// shape fail the whole class.
pub struct RenderPhaseWeaver {
    assembler: Box<dyn DispatchAssembler + Send + Sync>,
}

impl Default for RenderPhaseWeaver {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPhaseWeaver {
    /// Weaver with the default delegate-chain assembler
    pub fn new() -> Self {
        Self::with_assembler(Box::new(ChainAssembler))
    }

    /// Weaver with a custom composition backend
    pub fn with_assembler(assembler: Box<dyn DispatchAssembler + Send + Sync>) -> Self {
        Self { assembler }
    }

    /// Weave all matched render phase methods of `class`.
    ///
    /// For each phase with matches, the superclass routine for the same phase
    /// is looked up through the parent chain (absent routine means this class
    /// is the root contributor and no super call is composed), the routine is
    /// assembled and installed on the class, and the phase is recorded on the
    /// behavioral model. Weaving an already-woven class is a no-op.
    pub fn weave(
        &self,
        class: &mut ComponentClass,
        model: &mut MutableComponentModel,
    ) -> WeaveResult<()> {
        if class.is_woven() {
            return Ok(());
        }

        let grouped = group_by_phase(class)?;

        for phase in RenderPhase::ALL {
            let Some(methods) = grouped.get(&phase) else {
                continue;
            };

            let invokers = methods
                .iter()
                .map(|method| {
                    Invoker::new(
                        format!("{}.{}", class.name(), method.name()),
                        method.takes_writer(),
                        method.body(),
                    )
                })
                .collect();

            let super_routine = class
                .parent()
                .and_then(|parent| parent.dispatch_routine(phase));

            log::debug!(
                "weaving {} method(s) of {} into {:?} ({})",
                methods.len(),
                class.name(),
                phase,
                phase.description()
            );

            let routine = self.assembler.assemble(DispatchPlan {
                phase,
                invokers,
                super_routine,
            });
            class.install_routine(phase, routine);
            model.add_render_phase(phase);
        }

        class.mark_woven();
        Ok(())
    }
}

/// Group phase-matched declared methods by phase, in declaration order.
///
/// Overrides and lifecycle-signature methods are skipped; unmatched methods
/// are ordinary helpers and are ignored.
fn group_by_phase(
    class: &ComponentClass,
) -> WeaveResult<FxHashMap<RenderPhase, Vec<MethodInfo>>> {
    let mut grouped: FxHashMap<RenderPhase, Vec<MethodInfo>> = FxHashMap::default();

    for method in class.methods() {
        if method.is_override() || method.has_lifecycle_signature() {
            continue;
        }

        let Some(phase) = categorize(method) else {
            continue;
        };

        validate_shape(class, method)?;
        grouped.entry(phase).or_default().push(method.clone());
    }

    Ok(grouped)
}

/// Explicit tag wins; otherwise the conventional name decides
fn categorize(method: &MethodInfo) -> Option<RenderPhase> {
    method
        .phase_tag()
        .or_else(|| RenderPhase::from_method_name(method.name()))
}

/// A render phase method takes no parameters, or a single markup writer
fn validate_shape(class: &ComponentClass, method: &MethodInfo) -> WeaveResult<()> {
    match method.params() {
        [] => Ok(()),
        [ParamKind::MarkupWriter] => Ok(()),
        _ => Err(WeaveError::InvalidRenderPhaseMethod {
            method: format!("{}.{}", class.name(), method.name()),
        }),
    }
}

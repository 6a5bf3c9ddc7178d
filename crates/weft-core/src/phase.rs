//! Render phase metadata
//!
//! The eight stages of a component's rendering lifecycle. Each phase carries
//! its canonical dispatch method name, a human-readable description, and an
//! ordering flag: the last four phases are "reverse" phases whose local
//! methods run in declaration-reverse order and whose superclass call comes
//! after local methods instead of before.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

/// One of the eight predefined stages in a component's rendering lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderPhase {
    /// Initial setup, before any output is produced
    SetupRender,
    /// Start of the component's own output
    BeginRender,
    /// Just before the component's template renders
    BeforeRenderTemplate,
    /// Just before the component's body renders
    BeforeRenderBody,
    /// After the component's body has rendered (reverse)
    AfterRenderBody,
    /// After the component's template has rendered (reverse)
    AfterRenderTemplate,
    /// End of the component's own output (reverse)
    AfterRender,
    /// Final cleanup once rendering is complete (reverse)
    CleanupRender,
}

impl RenderPhase {
    /// All phases, in lifecycle order
    pub const ALL: [RenderPhase; 8] = [
        RenderPhase::SetupRender,
        RenderPhase::BeginRender,
        RenderPhase::BeforeRenderTemplate,
        RenderPhase::BeforeRenderBody,
        RenderPhase::AfterRenderBody,
        RenderPhase::AfterRenderTemplate,
        RenderPhase::AfterRender,
        RenderPhase::CleanupRender,
    ];

    /// Canonical dispatch method name for this phase
    pub fn method_name(self) -> &'static str {
        match self {
            RenderPhase::SetupRender => "setup_render",
            RenderPhase::BeginRender => "begin_render",
            RenderPhase::BeforeRenderTemplate => "before_render_template",
            RenderPhase::BeforeRenderBody => "before_render_body",
            RenderPhase::AfterRenderBody => "after_render_body",
            RenderPhase::AfterRenderTemplate => "after_render_template",
            RenderPhase::AfterRender => "after_render",
            RenderPhase::CleanupRender => "cleanup_render",
        }
    }

    /// Human-readable description of the phase, used in diagnostics
    pub fn description(self) -> &'static str {
        match self {
            RenderPhase::SetupRender => "setup before rendering",
            RenderPhase::BeginRender => "begin component output",
            RenderPhase::BeforeRenderTemplate => "before rendering the template",
            RenderPhase::BeforeRenderBody => "before rendering the body",
            RenderPhase::AfterRenderBody => "after rendering the body",
            RenderPhase::AfterRenderTemplate => "after rendering the template",
            RenderPhase::AfterRender => "end component output",
            RenderPhase::CleanupRender => "cleanup after rendering",
        }
    }

    /// Reverse phases run their local methods in declaration-reverse order
    /// and invoke the superclass routine after local methods, not before.
    pub fn is_reverse(self) -> bool {
        matches!(
            self,
            RenderPhase::AfterRenderBody
                | RenderPhase::AfterRenderTemplate
                | RenderPhase::AfterRender
                | RenderPhase::CleanupRender
        )
    }

    /// Match a declared method name against the canonical phase names.
    ///
    /// Comparison ignores case and underscores, so `afterRender`,
    /// `after_render`, and `AfterRender` all match [`RenderPhase::AfterRender`].
    pub fn from_method_name(name: &str) -> Option<RenderPhase> {
        NAME_TO_PHASE.get(fold_name(name).as_str()).copied()
    }
}

/// Fold a method name for convention matching: lowercase, underscores removed
fn fold_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Folded canonical name to phase, built once per process
static NAME_TO_PHASE: Lazy<FxHashMap<String, RenderPhase>> = Lazy::new(|| {
    let mut map = FxHashMap::default();
    for phase in RenderPhase::ALL {
        map.insert(fold_name(phase.method_name()), phase);
    }
    map
});

//! End-to-end weaving tests
//!
//! Builds small component class hierarchies, weaves them through the
//! registry, and drives the composed dispatch routines against recording
//! instances.

use std::any::Any;
use std::sync::Arc;

use weft_core::{
    BasicRenderEvent, ComponentClass, ComponentClassRegistry, Event, MemoryWriter, MethodBody,
    MethodInfo, ParamKind, RenderPhase,
};

/// Component instance recording the order methods ran in
#[derive(Default)]
struct Recorder {
    calls: Vec<String>,
}

fn recording(tag: &'static str) -> MethodBody {
    Arc::new(move |instance, _writer| {
        let recorder = instance.downcast_mut::<Recorder>().expect("recorder");
        recorder.calls.push(tag.to_string());
        Ok(None)
    })
}

fn recording_with_result(tag: &'static str) -> MethodBody {
    Arc::new(move |instance, _writer| {
        let recorder = instance.downcast_mut::<Recorder>().expect("recorder");
        recorder.calls.push(tag.to_string());
        Ok(Some(Box::new(tag) as Box<dyn Any + Send>))
    })
}

#[test]
fn forward_and_reverse_phases_across_a_hierarchy() {
    let mut registry = ComponentClassRegistry::new();

    let mut base = ComponentClass::new("app::base::Layout");
    base.add_method(MethodInfo::new("begin_render", recording("base.begin")));
    base.add_method(MethodInfo::new("after_render", recording("base.after")));
    let base = registry.register(base).unwrap();

    let mut page = ComponentClass::with_parent("app::pages::Index", base);
    page.add_method(
        MethodInfo::new("a", recording("a")).with_phase_tag(RenderPhase::BeginRender),
    );
    page.add_method(
        MethodInfo::new("b", recording("b")).with_phase_tag(RenderPhase::BeginRender),
    );
    page.add_method(
        MethodInfo::new("c", recording("c")).with_phase_tag(RenderPhase::AfterRender),
    );
    page.add_method(
        MethodInfo::new("d", recording("d")).with_phase_tag(RenderPhase::AfterRender),
    );
    let page = registry.register(page).unwrap();

    let mut recorder = Recorder::default();
    let mut writer = MemoryWriter::new();

    // Forward phase: super first, then a, b in declaration order.
    let mut event = BasicRenderEvent::new();
    page.dispatch_routine(RenderPhase::BeginRender)
        .unwrap()
        .dispatch(&mut recorder, &mut writer, &mut event)
        .unwrap();
    assert_eq!(recorder.calls, vec!["base.begin", "a", "b"]);

    // Reverse phase: d, c in reverse declaration order, super last.
    recorder.calls.clear();
    let mut event = BasicRenderEvent::new();
    page.dispatch_routine(RenderPhase::AfterRender)
        .unwrap()
        .dispatch(&mut recorder, &mut writer, &mut event)
        .unwrap();
    assert_eq!(recorder.calls, vec!["d", "c", "base.after"]);
}

#[test]
fn abort_during_super_call_skips_local_methods() {
    let mut registry = ComponentClassRegistry::new();

    let mut base = ComponentClass::new("app::base::Layout");
    base.add_method(MethodInfo::new(
        "begin_render",
        recording_with_result("base.begin"),
    ));
    let base = registry.register(base).unwrap();

    let mut page = ComponentClass::with_parent("app::pages::Index", base);
    page.add_method(MethodInfo::new("begin_render", recording("page.begin")));
    let page = registry.register(page).unwrap();

    let mut recorder = Recorder::default();
    let mut writer = MemoryWriter::new();
    let mut event = BasicRenderEvent::new();
    page.dispatch_routine(RenderPhase::BeginRender)
        .unwrap()
        .dispatch(&mut recorder, &mut writer, &mut event)
        .unwrap();

    assert_eq!(recorder.calls, vec!["base.begin"]);
    assert!(event.is_aborted());
}

#[test]
fn terminal_result_stops_remaining_methods_in_phase() {
    let mut registry = ComponentClassRegistry::new();

    let mut page = ComponentClass::new("app::pages::Index");
    page.add_method(
        MethodInfo::new("first", recording_with_result("first"))
            .with_phase_tag(RenderPhase::BeginRender),
    );
    page.add_method(
        MethodInfo::new("second", recording("second")).with_phase_tag(RenderPhase::BeginRender),
    );
    let page = registry.register(page).unwrap();

    let mut recorder = Recorder::default();
    let mut writer = MemoryWriter::new();
    let mut event = BasicRenderEvent::new();
    page.dispatch_routine(RenderPhase::BeginRender)
        .unwrap()
        .dispatch(&mut recorder, &mut writer, &mut event)
        .unwrap();

    assert_eq!(recorder.calls, vec!["first"]);
    assert_eq!(
        event.method_description(),
        Some("app::pages::Index.first")
    );
}

#[test]
fn writer_parameter_is_passed_through() {
    let writing: MethodBody = Arc::new(|_, writer| {
        let writer = writer.expect("writer argument");
        writer.write("<p>hello</p>");
        Ok(None)
    });

    let mut registry = ComponentClassRegistry::new();
    let mut page = ComponentClass::new("app::pages::Index");
    page.add_method(
        MethodInfo::new("begin_render", writing).with_params(vec![ParamKind::MarkupWriter]),
    );
    let page = registry.register(page).unwrap();

    let mut recorder = Recorder::default();
    let mut writer = MemoryWriter::new();
    let mut event = BasicRenderEvent::new();
    page.dispatch_routine(RenderPhase::BeginRender)
        .unwrap()
        .dispatch(&mut recorder, &mut writer, &mut event)
        .unwrap();

    assert_eq!(writer.contents(), "<p>hello</p>");
}

#[test]
fn helper_methods_are_left_untouched() {
    let mut registry = ComponentClassRegistry::new();
    let mut page = ComponentClass::new("app::pages::Index");
    page.add_method(MethodInfo::new("format_title", recording("helper")));
    page.add_method(MethodInfo::new("setup_render", recording("setup")));
    let page = registry.register(page).unwrap();

    assert!(page.dispatch_routine(RenderPhase::SetupRender).is_some());
    let model = registry.model("app::pages::Index").unwrap();
    assert_eq!(model.handled_phases(), &[RenderPhase::SetupRender]);
}

#[test]
fn invalid_render_phase_method_fails_class_registration() {
    let mut registry = ComponentClassRegistry::new();
    let mut page = ComponentClass::new("app::pages::Broken");
    page.add_method(
        MethodInfo::new("begin_render", recording("bad"))
            .with_params(vec![ParamKind::Other("u32".to_string())]),
    );

    let err = registry.register(page).unwrap_err();
    assert!(err.to_string().contains("app::pages::Broken.begin_render"));
    assert!(registry.is_empty());
}

#[test]
fn grandchild_chains_through_both_ancestors() {
    let mut registry = ComponentClassRegistry::new();

    let mut root = ComponentClass::new("app::base::Root");
    root.add_method(MethodInfo::new("cleanup_render", recording("root.cleanup")));
    let root = registry.register(root).unwrap();

    let mut middle = ComponentClass::with_parent("app::base::Middle", root);
    middle.add_method(MethodInfo::new("cleanup_render", recording("middle.cleanup")));
    let middle = registry.register(middle).unwrap();

    let mut leaf = ComponentClass::with_parent("app::pages::Leaf", middle);
    leaf.add_method(MethodInfo::new("cleanup_render", recording("leaf.cleanup")));
    let leaf = registry.register(leaf).unwrap();

    let mut recorder = Recorder::default();
    let mut writer = MemoryWriter::new();
    let mut event = BasicRenderEvent::new();
    leaf.dispatch_routine(RenderPhase::CleanupRender)
        .unwrap()
        .dispatch(&mut recorder, &mut writer, &mut event)
        .unwrap();

    // Reverse phase: leaf first, ancestors after, innermost last.
    assert_eq!(
        recorder.calls,
        vec!["leaf.cleanup", "middle.cleanup", "root.cleanup"]
    );
}

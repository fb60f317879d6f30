//! Integration tests: toolbar and size readout on the overlay.

use pretty_assertions::assert_eq;
use resize_core::{ElementId, NodeId, NodeScope, Range, Rect};
use resize_editor::{
    EventTarget, Host, InputEvent, MemoryHost, OverlayWidget, ResizeConfig, ResizeController,
    SizeLabel, ToolButton, ToolDescriptor, ToolFlow, ToolSpec,
};
use std::cell::Cell;
use std::rc::Rc;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pump(ctrl: &mut ResizeController<MemoryHost>) {
    for source in ctrl.host_mut().take_changes() {
        ctrl.handle_content_change(source);
    }
}

fn active(
    config: ResizeConfig,
    kind: &str,
    scope: NodeScope,
    tag: &str,
) -> (ResizeController<MemoryHost>, NodeId, ElementId) {
    init_logger();
    let mut host = MemoryHost::new();
    let rect = match scope {
        NodeScope::Inline => Rect::new(0.0, 0.0, 200.0, 150.0),
        NodeScope::Block => Rect::new(0.0, 0.0, 400.0, 225.0),
    };
    let (node, element) = host.push_embed_line(kind, scope, tag, rect);
    let mut ctrl = ResizeController::new(host, config);
    ctrl.handle_event(&InputEvent::pointer_down(
        5.0,
        5.0,
        EventTarget::Element(element),
    ));
    assert!(ctrl.is_active());
    (ctrl, node, element)
}

fn click(ctrl: &mut ResizeController<MemoryHost>, tool: &str) -> bool {
    ctrl.handle_event(&InputEvent::pointer_down(
        0.0,
        0.0,
        EventTarget::ToolButton(tool.into()),
    ))
    .is_handled()
}

fn buttons(ctrl: &ResizeController<MemoryHost>) -> Vec<ToolButton> {
    ctrl.overlay()
        .state()
        .and_then(|s| {
            s.widgets.iter().find_map(|w| match w {
                OverlayWidget::Toolbar { buttons } => Some(buttons.clone()),
                _ => None,
            })
        })
        .unwrap_or_default()
}

fn button(ctrl: &ResizeController<MemoryHost>, id: &str) -> Option<ToolButton> {
    buttons(ctrl).into_iter().find(|b| b.id == id)
}

fn format(ctrl: &ResizeController<MemoryHost>, node: NodeId, name: &str) -> Option<String> {
    let index = ctrl.host().node_offset(node)?;
    ctrl.host().format_value(index, name)
}

// ─── Alignment ──────────────────────────────────────────────────────────

#[test]
fn default_toolbar_lists_builtin_tools() {
    let (ctrl, _, _) = active(ResizeConfig::default(), "image", NodeScope::Inline, "IMG");
    let ids: Vec<String> = buttons(&ctrl).into_iter().map(|b| b.id).collect();
    assert_eq!(ids, vec!["left", "center", "right", "full", "edit"]);
    assert_eq!(
        button(&ctrl, "center").and_then(|b| b.class_name).as_deref(),
        Some("ql-resize-toolbar-center")
    );
}

#[test]
fn center_toggles_inline_format() {
    let (mut ctrl, node, _) = active(ResizeConfig::default(), "image", NodeScope::Inline, "IMG");

    assert!(click(&mut ctrl, "center"));
    assert_eq!(
        format(&ctrl, node, "resize-inline").as_deref(),
        Some("center")
    );
    assert!(button(&ctrl, "center").is_some_and(|b| b.active));
    assert!(button(&ctrl, "left").is_some_and(|b| !b.active));

    // Our own format write is swallowed; the target stays put.
    assert!(ctrl.expects_self_write());
    pump(&mut ctrl);
    assert!(!ctrl.expects_self_write());
    assert!(ctrl.is_active());

    // Clicking the applied alignment removes it.
    click(&mut ctrl, "center");
    assert_eq!(format(&ctrl, node, "resize-inline"), None);
    assert!(button(&ctrl, "center").is_some_and(|b| !b.active));
}

#[test]
fn switching_alignment_replaces_the_format() {
    let (mut ctrl, node, _) = active(ResizeConfig::default(), "image", NodeScope::Inline, "IMG");

    click(&mut ctrl, "left");
    pump(&mut ctrl);
    click(&mut ctrl, "right");
    assert_eq!(
        format(&ctrl, node, "resize-inline").as_deref(),
        Some("right")
    );
}

#[test]
fn block_embeds_use_the_line_format() {
    let (mut ctrl, node, _) =
        active(ResizeConfig::default(), "video", NodeScope::Block, "IFRAME");

    click(&mut ctrl, "full");
    assert_eq!(format(&ctrl, node, "resize-block").as_deref(), Some("full"));
    assert_eq!(format(&ctrl, node, "resize-inline"), None);
}

// ─── Actions ────────────────────────────────────────────────────────────

#[test]
fn edit_hands_back_to_text_editing() {
    let (mut ctrl, node, _) = active(ResizeConfig::default(), "image", NodeScope::Inline, "IMG");
    let index = ctrl.host().node_offset(node);

    assert!(click(&mut ctrl, "edit"));
    assert!(!ctrl.is_active());
    assert!(ctrl.host().is_focused());
    assert_eq!(ctrl.host().selection(), index.map(|i| Range::new(i, 1)));
}

#[test]
fn stopping_handler_skips_the_format() {
    let runs = Rc::new(Cell::new(0));
    let counter = runs.clone();
    let tool = ToolDescriptor::new("counter")
        .with_class("wide")
        .with_handler(move |_| {
            counter.set(counter.get() + 1);
            ToolFlow::Stop
        });
    let config = ResizeConfig {
        tools: vec![ToolSpec::Custom(tool)],
        ..ResizeConfig::default()
    };
    let (mut ctrl, node, _) = active(config, "image", NodeScope::Inline, "IMG");

    assert!(click(&mut ctrl, "counter"));
    assert_eq!(runs.get(), 1);
    assert_eq!(format(&ctrl, node, "resize-inline"), None);
    assert!(!ctrl.expects_self_write());
}

#[test]
fn continuing_handler_applies_the_format() {
    let tool = ToolDescriptor::new("wide")
        .with_class("wide")
        .with_handler(|_| ToolFlow::Continue);
    let config = ResizeConfig {
        tools: vec![ToolSpec::Custom(tool)],
        ..ResizeConfig::default()
    };
    let (mut ctrl, node, _) = active(config, "image", NodeScope::Inline, "IMG");

    click(&mut ctrl, "wide");
    assert_eq!(
        format(&ctrl, node, "resize-inline").as_deref(),
        Some("wide")
    );
}

#[test]
fn verify_hides_tools_per_target() {
    let video_only = ToolDescriptor::new("theater")
        .with_class("theater")
        .with_verify(|node, _| node.kind == "video");
    let config = ResizeConfig {
        tools: vec![
            ToolSpec::Custom(video_only),
            ToolSpec::Builtin(resize_editor::BuiltinTool::Edit),
        ],
        ..ResizeConfig::default()
    };

    let (mut ctrl, _, _) = active(config.clone(), "image", NodeScope::Inline, "IMG");
    assert!(button(&ctrl, "theater").is_none());
    assert!(!click(&mut ctrl, "theater"));

    let (ctrl, _, _) = active(config, "video", NodeScope::Block, "IFRAME");
    assert!(button(&ctrl, "theater").is_some());
}

// ─── Size readout ───────────────────────────────────────────────────────

#[test]
fn size_label_reads_the_rendered_size() {
    let (ctrl, _, _) = active(ResizeConfig::default(), "image", NodeScope::Inline, "IMG");
    let label = ctrl.host().rendered_overlay().and_then(|o| {
        o.widgets.iter().find_map(|w| match w {
            OverlayWidget::SizeLabel(label) => Some(label.clone()),
            _ => None,
        })
    });
    assert_eq!(
        label,
        Some(SizeLabel {
            text: "200 × 150".to_string(),
            inside: true,
        })
    );
}

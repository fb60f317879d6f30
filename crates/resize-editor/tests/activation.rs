//! Integration tests: activation, overlay lifecycle, and host notifications.
//!
//! Exercises the controller's single-target state machine against a
//! `MemoryHost`: click routing, the overlay ⇔ target invariant, scroll
//! compensation, stale-target detection, and the selection marker.

use pretty_assertions::assert_eq;
use resize_core::{ElementId, NodeId, NodeScope, OverlayPlacement, Range, Rect, ScrollOffset};
use resize_editor::{
    Capability, CapabilitySpec, ChangeSource, Context, EventOutcome, EventTarget, Hooks, Host,
    InputEvent, Leaf, MemoryHost, OverlayWidget, ResizeConfig, ResizeController, Subscription,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pump(ctrl: &mut ResizeController<MemoryHost>) {
    for source in ctrl.host_mut().take_changes() {
        ctrl.handle_content_change(source);
    }
}

fn click(ctrl: &mut ResizeController<MemoryHost>, target: EventTarget) -> EventOutcome {
    ctrl.handle_event(&InputEvent::pointer_down(1.0, 1.0, target))
}

/// Two images on one line, then a block video.
struct Doc {
    host: MemoryHost,
    first: (NodeId, ElementId),
    second: (NodeId, ElementId),
    video: (NodeId, ElementId),
}

fn doc() -> Doc {
    init_logger();
    let mut host = MemoryHost::new();
    host.set_container(Rect::new(0.0, 0.0, 800.0, 600.0));
    let leaves = host.push_line(vec![
        Leaf::text(3),
        Leaf::embed("image", "IMG", Rect::new(30.0, 0.0, 200.0, 150.0)),
        Leaf::embed("image", "IMG", Rect::new(240.0, 0.0, 160.0, 120.0)),
        Leaf::text(2),
    ]);
    let video = host.push_embed_line(
        "video",
        NodeScope::Block,
        "IFRAME",
        Rect::new(0.0, 200.0, 400.0, 225.0),
    );
    Doc {
        host,
        first: (leaves[1].0, leaves[1].1.unwrap()),
        second: (leaves[2].0, leaves[2].1.unwrap()),
        video,
    }
}

#[derive(Default)]
struct Counts {
    active: Cell<usize>,
    inactive: Cell<usize>,
}

fn counting_config() -> (ResizeConfig, Rc<Counts>) {
    let counts = Rc::new(Counts::default());
    let (on, off) = (counts.clone(), counts.clone());
    let config = ResizeConfig::default().with_hooks(Hooks {
        on_active: Some(Rc::new(move |_, _| on.active.set(on.active.get() + 1))),
        on_inactive: Some(Rc::new(move |_, _| off.inactive.set(off.inactive.get() + 1))),
        ..Hooks::default()
    });
    (config, counts)
}

fn assert_overlay_tracks_target(ctrl: &ResizeController<MemoryHost>) {
    assert_eq!(ctrl.overlay().is_shown(), ctrl.is_active());
    assert_eq!(ctrl.host().rendered_overlay().is_some(), ctrl.is_active());
}

// ─── Construction ───────────────────────────────────────────────────────

#[test]
fn construction_prepares_the_surface() {
    let Doc { host, .. } = doc();
    let ctrl = ResizeController::new(host, ResizeConfig::default());
    assert!(ctrl.host().click_through());
    assert!(!ctrl.host().native_resize());
    assert!(!ctrl.is_active());
}

#[test]
fn no_embed_tags_means_no_click_through() {
    let Doc { host, .. } = doc();
    let config = ResizeConfig::from_json(r#"{"embedTags": []}"#).unwrap();
    let ctrl = ResizeController::new(host, config);
    assert!(!ctrl.host().click_through());
}

// ─── Activation ─────────────────────────────────────────────────────────

#[test]
fn click_activates_and_mounts_in_order() {
    let Doc { host, first, .. } = doc();
    let mut ctrl = ResizeController::new(host, ResizeConfig::default());
    click(&mut ctrl, EventTarget::Element(first.1));

    assert_eq!(ctrl.target().map(|t| t.node.id), Some(first.0));
    assert_eq!(
        ctrl.capability_names(),
        vec!["DisplaySize", "Toolbar", "Resize", "Keyboard"]
    );
    assert!(ctrl.host().has_class(first.1, "active"));
    assert!(!ctrl.host().user_select());
    assert_eq!(ctrl.host().selection(), None);
    assert_eq!(ctrl.host().subscription_count(Subscription::RootInput), 1);
    assert_eq!(ctrl.host().subscription_count(Subscription::RootScroll), 1);
    assert_eq!(ctrl.host().subscription_count(Subscription::DocumentKeys), 1);

    let overlay = ctrl.host().rendered_overlay().unwrap();
    let handles: Vec<_> = overlay
        .widgets
        .iter()
        .filter_map(|w| match w {
            OverlayWidget::Handle { position } => Some(position.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(handles, vec!["tl", "tr", "br", "bl"]);
    assert!(
        overlay
            .widgets
            .iter()
            .any(|w| matches!(w, OverlayWidget::Toolbar { .. }))
    );
    assert_overlay_tracks_target(&ctrl);
}

#[test]
fn outside_click_deactivates_exactly_once() {
    let Doc { host, first, .. } = doc();
    let (config, counts) = counting_config();
    let mut ctrl = ResizeController::new(host, config);

    click(&mut ctrl, EventTarget::Element(first.1));
    click(&mut ctrl, EventTarget::Outside);

    assert!(!ctrl.is_active());
    assert_eq!(counts.active.get(), 1);
    assert_eq!(counts.inactive.get(), 1);
    assert!(!ctrl.host().has_class(first.1, "active"));
    assert!(ctrl.host().user_select());
    assert_eq!(ctrl.host().live_subscriptions(), vec![]);
    assert_overlay_tracks_target(&ctrl);
}

#[test]
fn clicking_the_active_node_again_is_a_no_op() {
    let Doc { host, first, .. } = doc();
    let (config, counts) = counting_config();
    let mut ctrl = ResizeController::new(host, config);

    click(&mut ctrl, EventTarget::Element(first.1));
    click(&mut ctrl, EventTarget::Element(first.1));

    assert_eq!(counts.active.get(), 1);
    assert_eq!(counts.inactive.get(), 0);
}

#[test]
fn activating_click_suppresses_the_default() {
    let Doc { host, first, .. } = doc();
    let mut ctrl = ResizeController::new(host, ResizeConfig::default());

    assert_eq!(
        click(&mut ctrl, EventTarget::Element(first.1)),
        EventOutcome::Handled
    );
    assert_eq!(
        click(&mut ctrl, EventTarget::Element(first.1)),
        EventOutcome::Handled
    );
    assert_eq!(click(&mut ctrl, EventTarget::Outside), EventOutcome::Ignored);
    assert!(!ctrl.is_active());
}

#[test]
fn active_node_below_the_width_floor_stays_active() {
    let Doc { host, first, .. } = doc();
    let mut ctrl = ResizeController::new(host, ResizeConfig::default());
    click(&mut ctrl, EventTarget::Element(first.1));

    // A constrained commit can leave the element narrower than `minWidth`.
    ctrl.host_mut().set_rect(first.1, Rect::new(30.0, 0.0, 60.0, 45.0));
    assert!(click(&mut ctrl, EventTarget::Element(first.1)).is_handled());
    assert_eq!(ctrl.target().map(|t| t.node.id), Some(first.0));

    // Once released, the same narrow node is no longer eligible.
    click(&mut ctrl, EventTarget::Outside);
    assert!(!click(&mut ctrl, EventTarget::Element(first.1)).is_handled());
    assert!(!ctrl.is_active());
}

#[test]
fn switching_targets_tears_down_first() {
    let Doc {
        host,
        first,
        second,
        ..
    } = doc();
    let (config, counts) = counting_config();
    let mut ctrl = ResizeController::new(host, config);

    click(&mut ctrl, EventTarget::Element(first.1));
    click(&mut ctrl, EventTarget::Element(second.1));

    assert_eq!(ctrl.target().map(|t| t.element), Some(second.1));
    assert_eq!(counts.active.get(), 2);
    assert_eq!(counts.inactive.get(), 1);
    assert!(!ctrl.host().has_class(first.1, "active"));
    assert!(ctrl.host().has_class(second.1, "active"));
    // One overlay's worth of listeners, not two.
    assert_eq!(ctrl.host().subscription_count(Subscription::RootInput), 1);
    assert_eq!(ctrl.host().subscription_count(Subscription::DocumentKeys), 1);
}

#[test]
fn at_most_one_target_across_click_sequences() {
    let Doc {
        host,
        first,
        second,
        video,
    } = doc();
    let mut ctrl = ResizeController::new(host, ResizeConfig::default());

    let sequence = [
        EventTarget::Element(first.1),
        EventTarget::Element(video.1),
        EventTarget::Outside,
        EventTarget::Element(second.1),
        EventTarget::Element(second.1),
        EventTarget::Root,
        EventTarget::Element(first.1),
    ];
    for target in sequence {
        click(&mut ctrl, target);
        assert_overlay_tracks_target(&ctrl);
        let active = [first.1, second.1, video.1]
            .iter()
            .filter(|el| ctrl.host().has_class(**el, "active"))
            .count();
        assert!(active <= 1, "{active} active markers");
        assert_eq!(active, usize::from(ctrl.is_active()));
    }
}

#[test]
fn root_click_hit_tests_through_embeds() {
    let Doc { host, video, .. } = doc();
    let mut ctrl = ResizeController::new(host, ResizeConfig::default());

    ctrl.handle_event(&InputEvent::pointer_down(100.0, 300.0, EventTarget::Root));
    assert_eq!(ctrl.target().map(|t| t.element), Some(video.1));
    // Click-through is restored after the hit test.
    assert!(ctrl.host().click_through());
}

#[test]
fn narrow_or_unprofiled_nodes_do_not_activate() {
    let Doc { mut host, .. } = doc();
    let (_, narrow) = host.push_embed_line(
        "image",
        NodeScope::Inline,
        "IMG",
        Rect::new(0.0, 500.0, 60.0, 40.0),
    );
    let (_, formula) = host.push_embed_line(
        "formula",
        NodeScope::Inline,
        "SPAN",
        Rect::new(0.0, 550.0, 300.0, 40.0),
    );
    let mut ctrl = ResizeController::new(host, ResizeConfig::default());

    click(&mut ctrl, EventTarget::Element(narrow));
    assert!(!ctrl.is_active());
    click(&mut ctrl, EventTarget::Element(formula));
    assert!(!ctrl.is_active());
}

// ─── Overlay placement ──────────────────────────────────────────────────

#[test]
fn overlay_follows_scroll() {
    let Doc { mut host, first, .. } = doc();
    host.set_container(Rect::new(10.0, 20.0, 800.0, 600.0));
    let mut ctrl = ResizeController::new(host, ResizeConfig::default());
    click(&mut ctrl, EventTarget::Element(first.1));

    let placement = ctrl.host().rendered_overlay().unwrap().placement;
    assert_eq!(
        placement,
        OverlayPlacement {
            left: 19.0,
            top: -20.0,
            width: 200.0,
            height: 150.0,
            margin_top: 0.0,
        }
    );

    ctrl.host_mut().set_scroll(ScrollOffset {
        left: 0.0,
        top: 40.0,
    });
    ctrl.handle_event(&InputEvent::Scroll);
    let placement = ctrl.host().rendered_overlay().unwrap().placement;
    assert_eq!(placement.margin_top, -40.0);
}

#[test]
fn reposition_without_target_changes_nothing() {
    let Doc { host, .. } = doc();
    let mut ctrl = ResizeController::new(host, ResizeConfig::default());

    ctrl.on_update();
    let renders = ctrl.host().overlay_renders();
    ctrl.on_update();
    ctrl.on_update();

    assert_eq!(ctrl.host().overlay_renders(), renders);
    assert_eq!(ctrl.host().rendered_overlay(), None);
    assert!(!ctrl.is_active());
}

// ─── Host notifications ─────────────────────────────────────────────────

#[test]
fn foreign_change_repositions_the_same_target() {
    let Doc { host, second, .. } = doc();
    let mut ctrl = ResizeController::new(host, ResizeConfig::default());
    click(&mut ctrl, EventTarget::Element(second.1));

    ctrl.host_mut().set_rect(second.1, Rect::new(300.0, 0.0, 160.0, 120.0));
    ctrl.handle_content_change(ChangeSource::User);

    assert_eq!(ctrl.target().map(|t| t.node.id), Some(second.0));
    let placement = ctrl.host().rendered_overlay().unwrap().placement;
    assert_eq!(placement.left, 299.0);
}

#[test]
fn removed_target_deactivates() {
    let Doc { host, first, .. } = doc();
    let mut ctrl = ResizeController::new(host, ResizeConfig::default());
    click(&mut ctrl, EventTarget::Element(first.1));

    ctrl.host_mut().delete_node(first.0);
    pump(&mut ctrl);

    assert!(!ctrl.is_active());
    assert_overlay_tracks_target(&ctrl);
}

#[test]
fn rerendered_target_deactivates() {
    let Doc { host, video, .. } = doc();
    let mut ctrl = ResizeController::new(host, ResizeConfig::default());
    click(&mut ctrl, EventTarget::Element(video.1));

    ctrl.host_mut()
        .rerender(video.0, "IFRAME", Rect::new(0.0, 200.0, 400.0, 225.0));
    pump(&mut ctrl);

    assert!(!ctrl.is_active());
}

#[test]
fn typing_deactivates() {
    let Doc { host, first, .. } = doc();
    let mut ctrl = ResizeController::new(host, ResizeConfig::default());
    click(&mut ctrl, EventTarget::Element(first.1));

    ctrl.handle_event(&InputEvent::RootInput);
    assert!(!ctrl.is_active());
}

#[test]
fn double_click_hands_back_to_text_editing() {
    let Doc { host, first, .. } = doc();
    let mut ctrl = ResizeController::new(host, ResizeConfig::default());
    click(&mut ctrl, EventTarget::Element(first.1));

    let outcome = ctrl.handle_event(&InputEvent::DoubleClick {
        target: EventTarget::Overlay,
    });

    assert!(outcome.is_handled());
    assert!(!ctrl.is_active());
    assert!(ctrl.host().is_focused());
    assert_eq!(ctrl.host().selection(), Some(Range::new(3, 1)));
}

#[test]
fn selection_marks_eligible_leaves() {
    let Doc {
        host,
        first,
        second,
        video,
    } = doc();
    let mut ctrl = ResizeController::new(host, ResizeConfig::default());

    // Covers the first image only.
    ctrl.handle_selection_change(Some(Range::new(0, 4)));
    assert!(ctrl.host().has_class(first.1, "selected"));
    assert!(!ctrl.host().has_class(second.1, "selected"));

    // Now the second image and the video, not the first.
    ctrl.handle_selection_change(Some(Range::new(4, 5)));
    assert!(!ctrl.host().has_class(first.1, "selected"));
    assert!(ctrl.host().has_class(second.1, "selected"));
    assert!(ctrl.host().has_class(video.1, "selected"));

    ctrl.handle_selection_change(None);
    assert!(!ctrl.host().has_class(second.1, "selected"));
    assert!(!ctrl.host().has_class(video.1, "selected"));
}

// ─── Capability lifecycle ───────────────────────────────────────────────

type Journal = Rc<RefCell<Vec<String>>>;

/// Records lifecycle calls. With `pings`, a touch cancel asks for an update.
struct Recorder {
    name: &'static str,
    pings: bool,
    journal: Journal,
}

impl Recorder {
    fn spec(name: &'static str, pings: bool, journal: &Journal) -> CapabilitySpec {
        let journal = journal.clone();
        CapabilitySpec::custom(move || {
            Box::new(Recorder {
                name,
                pings,
                journal: journal.clone(),
            })
        })
    }

    fn note(&self, call: &str) {
        self.journal.borrow_mut().push(format!("{}.{call}", self.name));
    }
}

impl Capability for Recorder {
    fn name(&self) -> &str {
        self.name
    }

    fn mount(&mut self, _cx: &mut Context<'_>) {
        self.note("mount");
    }

    fn unmount(&mut self, _cx: &mut Context<'_>) {
        self.note("unmount");
    }

    fn update(&mut self, _cx: &mut Context<'_>) {
        self.note("update");
    }

    fn handle(&mut self, event: &InputEvent, cx: &mut Context<'_>) -> EventOutcome {
        if self.pings && *event == InputEvent::PointerCancel {
            cx.request_update();
            return EventOutcome::Handled;
        }
        EventOutcome::Ignored
    }
}

fn drain(journal: &Journal) -> Vec<String> {
    journal.borrow_mut().drain(..).collect()
}

#[test]
fn custom_capabilities_follow_the_lifecycle() {
    let Doc { host, first, .. } = doc();
    let journal = Journal::default();
    let config = ResizeConfig {
        capabilities: vec![
            Recorder::spec("A", true, &journal),
            Recorder::spec("B", false, &journal),
        ],
        ..ResizeConfig::default()
    };
    let mut ctrl = ResizeController::new(host, config);

    click(&mut ctrl, EventTarget::Element(first.1));
    assert_eq!(ctrl.capability_names(), vec!["A", "B"]);
    assert_eq!(
        drain(&journal),
        vec!["A.mount", "B.mount", "A.update", "B.update"]
    );

    // A's update request reaches every mounted capability.
    assert!(ctrl.handle_event(&InputEvent::PointerCancel).is_handled());
    assert_eq!(drain(&journal), vec!["A.update", "B.update"]);

    ctrl.deactivate();
    assert_eq!(drain(&journal), vec!["B.unmount", "A.unmount"]);
    assert!(ctrl.capability_names().is_empty());
}

#[test]
fn switching_targets_unmounts_before_remounting() {
    let Doc {
        host,
        first,
        second,
        ..
    } = doc();
    let journal = Journal::default();
    let config = ResizeConfig {
        capabilities: vec![
            Recorder::spec("A", false, &journal),
            Recorder::spec("B", false, &journal),
        ],
        ..ResizeConfig::default()
    };
    let mut ctrl = ResizeController::new(host, config);

    click(&mut ctrl, EventTarget::Element(first.1));
    drain(&journal);
    click(&mut ctrl, EventTarget::Element(second.1));
    assert_eq!(
        drain(&journal),
        vec!["B.unmount", "A.unmount", "A.mount", "B.mount", "A.update", "B.update"]
    );
}

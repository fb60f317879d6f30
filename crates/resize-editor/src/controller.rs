//! Resize controller: the top-level orchestrator.
//!
//! Owns the single active target, the overlay, and the capabilities mounted
//! for that target. Every entry point is an event handler; none returns an
//! error. Lookups that miss (no node, no profile, no geometry) leave the
//! state machine where it was or deactivate.
//!
//! ## State
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `target` | The active node and its element. `Some` ⇔ overlay shown. |
//! | `capabilities` | Instances mounted for `target`; empty when idle. |
//! | `self_write` | The next content change was caused by a capability. |
//! | `selected` | Elements carrying the selection marker. |

use crate::capability::{ActiveTarget, CapabilityRegistry, Context, EventOutcome, Requests};
use crate::config::ResizeConfig;
use crate::host::{ChangeSource, Host};
use crate::input::{EventTarget, InputEvent, Key};
use crate::keyboard::navigation_target;
use crate::overlay::Overlay;
use crate::resize::NaturalSizes;
use resize_core::{ElementId, NodeRef, Range};

/// The element to activate for `node`, or `None` when the node type has no
/// profile or the element is narrower than the profile's `min_width`.
pub fn eligible_element(
    host: &dyn Host,
    config: &ResizeConfig,
    node: &NodeRef,
    element: ElementId,
) -> Option<ElementId> {
    let profile = config.profile(&node.kind)?;
    if let Some(min_width) = profile.limit.min_width {
        let width = host.bounding_rect(element)?.width;
        if width < min_width {
            return None;
        }
    }
    Some(element)
}

pub struct ResizeController<H: Host> {
    host: H,
    config: ResizeConfig,
    target: Option<ActiveTarget>,
    overlay: Overlay,
    capabilities: CapabilityRegistry,
    natural_sizes: NaturalSizes,
    self_write: bool,
    selected: Vec<ElementId>,
}

impl<H: Host> ResizeController<H> {
    pub fn new(mut host: H, config: ResizeConfig) -> Self {
        host.disable_native_resize();
        if !config.embed_tags.is_empty() {
            host.set_click_through(true);
        }
        Self {
            host,
            config,
            target: None,
            overlay: Overlay::new(),
            capabilities: CapabilityRegistry::default(),
            natural_sizes: NaturalSizes::new(),
            self_write: false,
            selected: Vec::new(),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &ResizeConfig {
        &self.config
    }

    pub fn target(&self) -> Option<&ActiveTarget> {
        self.target.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn natural_sizes(&self) -> &NaturalSizes {
        &self.natural_sizes
    }

    /// Names of the mounted capabilities, in mount order.
    pub fn capability_names(&self) -> Vec<String> {
        self.capabilities.names()
    }

    /// A capability write is pending acknowledgement.
    pub fn expects_self_write(&self) -> bool {
        self.self_write
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Route an input event. `Handled` ⇒ the caller prevents the default.
    pub fn handle_event(&mut self, event: &InputEvent) -> EventOutcome {
        match event {
            InputEvent::PointerDown { x, y, target, .. } => match target {
                EventTarget::Root | EventTarget::Element(_) | EventTarget::Outside => {
                    self.handle_pointer_down(*x, *y, target)
                }
                EventTarget::Overlay | EventTarget::Handle(_) | EventTarget::ToolButton(_) => {
                    self.dispatch(event)
                }
            },
            InputEvent::DoubleClick {
                target: EventTarget::Overlay | EventTarget::Handle(_),
            } if self.target.is_some() => {
                self.handle_edit_request();
                EventOutcome::Handled
            }
            InputEvent::DoubleClick { .. } => EventOutcome::Ignored,
            InputEvent::Scroll => {
                self.overlay.sync_scroll(&mut self.host);
                EventOutcome::Ignored
            }
            InputEvent::RootInput => {
                // Typing may have moved or removed the node.
                self.deactivate();
                EventOutcome::Ignored
            }
            InputEvent::PointerMove { .. }
            | InputEvent::PointerUp { .. }
            | InputEvent::PointerCancel
            | InputEvent::Key(_) => self.dispatch(event),
        }
    }

    /// Activate the node under a click, or deactivate when the click missed.
    /// `Handled` while the clicked node is the active one, so the host does
    /// not place a caret on it.
    pub fn handle_pointer_down(&mut self, x: f32, y: f32, target: &EventTarget) -> EventOutcome {
        let element = match target {
            EventTarget::Element(element) => Some(*element),
            EventTarget::Root => self.hit_test(x, y),
            _ => None,
        };
        let node = element.and_then(|el| self.host.find_node(el).map(|node| (node, el)));

        let activated = match node {
            Some((node, element)) => self.try_activate(node, element),
            None => false,
        };
        if activated {
            return EventOutcome::Handled;
        }
        if self.target.is_some() {
            self.deactivate();
        }
        EventOutcome::Ignored
    }

    /// The click landed on the root: find what is really under the pointer,
    /// with embed click-through lifted for the duration of the hit test.
    fn hit_test(&mut self, x: f32, y: f32) -> Option<ElementId> {
        let through = !self.config.embed_tags.is_empty();
        if through {
            self.host.set_click_through(false);
        }
        let hit = self.host.element_from_point(x, y);
        if through {
            self.host.set_click_through(true);
        }
        hit.filter(|el| *el != self.host.root())
    }

    /// Arrow-key interceptor, consulted before the host moves the caret.
    /// `Handled` ⇒ a node was activated and the caret must stay put.
    pub fn intercept_navigation(&mut self, key: &Key, range: Range) -> EventOutcome {
        if !self.config.keyboard_select {
            return EventOutcome::Ignored;
        }
        let Some((node, element)) = navigation_target(&self.host, &self.config, key, range) else {
            return EventOutcome::Ignored;
        };
        if self.try_activate(node, element) {
            EventOutcome::Handled
        } else {
            EventOutcome::Ignored
        }
    }

    // ─── Host notifications ──────────────────────────────────────────────

    pub fn handle_content_change(&mut self, source: ChangeSource) {
        if self.self_write {
            self.self_write = false;
            log::trace!("own write acknowledged ({source:?})");
            return;
        }
        let Some(target) = self.target.as_ref() else {
            return;
        };

        let removed = self.host.node_offset(target.node.id).is_none();
        let remapped = self.host.element_of(target.node.id) != Some(target.element);
        if removed || remapped {
            log::debug!("target {} is stale, deactivating", target.node.id);
            let node = target.node.id;
            self.deactivate();
            if removed {
                self.natural_sizes.forget(node);
            }
            return;
        }
        self.on_update();
    }

    /// Mark eligible nodes inside the text selection.
    pub fn handle_selection_change(&mut self, range: Option<Range>) {
        let Some(class) = self.config.selected_class.clone() else {
            return;
        };
        let marked: Vec<ElementId> = match range {
            Some(range) => self
                .host
                .leaves_in(range)
                .into_iter()
                .filter(|node| self.config.profile(&node.kind).is_some())
                .filter_map(|node| self.host.element_of(node.id))
                .collect(),
            None => Vec::new(),
        };

        for element in &self.selected {
            if !marked.contains(element) {
                self.host.remove_class(*element, &class);
            }
        }
        for element in &marked {
            if !self.selected.contains(element) {
                self.host.add_class(*element, &class);
            }
        }
        self.selected = marked;
    }

    /// Leave the active node and put a one-character selection on it.
    pub fn handle_edit_request(&mut self) {
        let Some(target) = self.target.as_ref() else {
            return;
        };
        let offset = self.host.node_offset(target.node.id);
        self.deactivate();
        self.host.focus();
        if let Some(index) = offset {
            self.host.set_selection(Some(Range::new(index, 1)));
        }
    }

    // ─── Activation ──────────────────────────────────────────────────────

    /// Activate `node` if eligible. `true` when it is (or already was) the
    /// active target.
    /// The active node stays active even if a commit left it below the
    /// width floor.
    pub fn try_activate(&mut self, node: NodeRef, element: ElementId) -> bool {
        if self.target.as_ref().is_some_and(|t| t.node.id == node.id) {
            return true;
        }
        let Some(element) = eligible_element(&self.host, &self.config, &node, element) else {
            return false;
        };
        self.activate(node, element);
        self.target.is_some()
    }

    pub fn activate(&mut self, node: NodeRef, element: ElementId) {
        if self.config.profile(&node.kind).is_none() {
            log::debug!("no profile for {}, not activating", node.kind);
            return;
        }
        self.deactivate();

        log::debug!("activate {} ({})", node.id, node.kind);
        self.target = Some(ActiveTarget {
            node: node.clone(),
            element,
        });
        self.overlay.show(&mut self.host, element);
        self.capabilities = CapabilityRegistry::instantiate(&self.config.capabilities);
        if let Some(((), requests)) = self.with_capabilities(|caps, cx| caps.mount_all(cx)) {
            self.apply_requests(requests);
        }
        // A mount hook may have bounced activation elsewhere.
        if self.target.as_ref().is_none_or(|t| t.node.id != node.id) {
            return;
        }

        if let Some(class) = &self.config.active_class {
            self.host.add_class(element, class);
        }
        if let Some(hook) = self.config.hooks.on_active.clone() {
            hook(&node, element);
        }
        self.on_update();
    }

    pub fn deactivate(&mut self) {
        if self.target.is_none() {
            return;
        }
        // Teardown requests are dropped apart from the write guard.
        if let Some(((), requests)) = self.with_capabilities(|caps, cx| caps.unmount_all(cx)) {
            self.self_write |= requests.self_write;
        }
        self.capabilities = CapabilityRegistry::default();
        self.overlay.hide(&mut self.host);

        let Some(target) = self.target.take() else {
            return;
        };
        log::debug!("deactivate {}", target.node.id);
        if let Some(class) = &self.config.active_class {
            self.host.remove_class(target.element, class);
        }
        if let Some(hook) = self.config.hooks.on_inactive.clone() {
            hook(&target.node, target.element);
        }
    }

    /// Reposition the overlay and broadcast `update` to every capability.
    pub fn on_update(&mut self) {
        if let Some(((), mut requests)) = self.with_capabilities(|caps, cx| caps.update_all(cx)) {
            requests.update = false;
            self.apply_requests(requests);
        }
        let element = self.target.as_ref().map(|t| t.element);
        self.overlay.reposition(&mut self.host, element);
    }

    // ─── Capability plumbing ─────────────────────────────────────────────

    fn dispatch(&mut self, event: &InputEvent) -> EventOutcome {
        match self.with_capabilities(|caps, cx| caps.dispatch(event, cx)) {
            Some((outcome, requests)) => {
                self.apply_requests(requests);
                outcome
            }
            None => EventOutcome::Ignored,
        }
    }

    /// Run `f` against the registry with a context for the active target.
    /// `None` when idle.
    fn with_capabilities<R>(
        &mut self,
        f: impl FnOnce(&mut CapabilityRegistry, &mut Context<'_>) -> R,
    ) -> Option<(R, Requests)> {
        let target = self.target.as_ref()?;
        let profile = self.config.profile(&target.node.kind)?;
        let mut requests = Requests::default();
        let mut cx = Context {
            host: &mut self.host,
            target,
            profile,
            overlay: &mut self.overlay,
            config: &self.config,
            natural_sizes: &mut self.natural_sizes,
            requests: &mut requests,
        };
        let out = f(&mut self.capabilities, &mut cx);
        Some((out, requests))
    }

    fn apply_requests(&mut self, requests: Requests) {
        if requests.self_write {
            self.self_write = true;
        }
        if requests.edit {
            self.handle_edit_request();
        } else if let Some((node, element)) = requests.activate {
            self.activate(node, element);
        } else if requests.deactivate {
            self.deactivate();
        }
        if requests.update {
            self.on_update();
        }
    }
}

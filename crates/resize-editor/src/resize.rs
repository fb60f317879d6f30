//! Drag-resize capability.
//!
//! Four corner handles; a press on one starts a drag session that lives
//! until the matching pointer-up or cancel, wherever it lands. Moves write a
//! live inline size; the release commits the constrained size as node
//! attributes in one batched write.

use crate::capability::{Capability, Context, EventOutcome};
use crate::host::{CursorScope, Host, Subscription};
use crate::input::{EventTarget, InputEvent};
use crate::overlay::OverlayWidget;
use resize_core::{
    ConstraintProfile, ElementId, HandlePosition, NATURAL_SIZE_ATTR, NodeId, ResolvedSize, Size,
    format_natural_size, parse_natural_size, resolve_drag,
};
use smallvec::SmallVec;
use std::collections::HashMap;

// ─── Natural sizes ───────────────────────────────────────────────────────

/// Natural (unscaled) size per node, so repeated resizes reference the
/// original dimensions rather than the previous result.
#[derive(Debug, Default)]
pub struct NaturalSizes {
    sizes: HashMap<NodeId, Size>,
}

impl NaturalSizes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node: NodeId) -> Option<Size> {
        self.sizes.get(&node).copied()
    }

    pub fn forget(&mut self, node: NodeId) {
        self.sizes.remove(&node);
    }

    /// Look up or establish the natural size of `node`.
    ///
    /// Order: the table, then a `data-size` attribute, then the element's
    /// intrinsic size, then its rendered size. A freshly computed size is
    /// written to `data-size` when `persist` is set; the returned flag
    /// reports whether that write happened.
    pub fn resolve(
        &mut self,
        host: &mut dyn Host,
        node: NodeId,
        element: ElementId,
        persist: bool,
    ) -> (Size, bool) {
        if let Some(size) = self.get(node) {
            return (size, false);
        }

        if let Some(value) = host.attribute(node, NATURAL_SIZE_ATTR) {
            match parse_natural_size(&value) {
                Ok(size) => {
                    self.sizes.insert(node, size);
                    return (size, false);
                }
                Err(e) => log::warn!("ignoring {NATURAL_SIZE_ATTR} on {node}: {e}"),
            }
        }

        let size = host
            .intrinsic_size(element)
            .filter(|s| s.width > 0.0 && s.height > 0.0)
            .or_else(|| host.bounding_rect(element).map(|r| r.size()))
            .unwrap_or_default();
        self.sizes.insert(node, size);

        if persist {
            host.set_attributes(node, &[(NATURAL_SIZE_ATTR, Some(format_natural_size(size)))]);
        }
        (size, persist)
    }
}

// ─── UI lock ─────────────────────────────────────────────────────────────

/// Resize cursor forced on the target and the body for the whole gesture.
#[derive(Debug)]
struct UiLock {
    element: ElementId,
}

impl UiLock {
    fn acquire(host: &mut dyn Host, element: ElementId, cursor: &str) -> Self {
        host.set_cursor(CursorScope::Element(element), Some(cursor));
        host.set_cursor(CursorScope::Body, Some(cursor));
        Self { element }
    }

    fn release(self, host: &mut dyn Host) {
        host.set_cursor(CursorScope::Element(self.element), None);
        host.set_cursor(CursorScope::Body, None);
    }
}

// ─── Drag session ────────────────────────────────────────────────────────

/// State of one handle drag.
#[derive(Debug)]
pub struct DragSession {
    pub handle: HandlePosition,
    /// Pointer position at press.
    pub start: (f32, f32),
    /// Last pointer position seen; used when the gesture is cancelled.
    pub last: (f32, f32),
    /// Rendered size at press.
    pub origin: Size,
    pub natural: Size,
    pub profile: ConstraintProfile,
    lock: UiLock,
}

impl DragSession {
    /// Constrained size for a pointer at `(x, y)`.
    pub fn size_at(&self, x: f32, y: f32) -> ResolvedSize {
        resolve_drag(
            self.origin,
            self.handle,
            x - self.start.0,
            y - self.start.1,
            &self.profile,
        )
    }
}

/// The drag-resize capability.
#[derive(Debug, Default)]
pub struct DragResize {
    session: Option<DragSession>,
}

impl DragResize {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    fn begin(
        &mut self,
        handle: HandlePosition,
        x: f32,
        y: f32,
        cx: &mut Context<'_>,
    ) -> EventOutcome {
        if self.session.is_some() {
            return EventOutcome::Handled;
        }
        let element = cx.target.element;
        let Some(rect) = cx.host.bounding_rect(element) else {
            return EventOutcome::Ignored;
        };

        let (natural, wrote) = cx.natural_sizes.resolve(
            cx.host,
            cx.target.node.id,
            element,
            cx.config.persist_natural_size,
        );
        if wrote {
            cx.mark_self_write();
        }

        let lock = UiLock::acquire(cx.host, element, handle.cursor());
        cx.host.subscribe(Subscription::DocumentPointer);

        log::debug!(
            "drag {} on {} from {:?}, natural {:?}",
            handle.as_str(),
            cx.target.node.id,
            rect.size(),
            natural
        );
        self.session = Some(DragSession {
            handle,
            start: (x, y),
            last: (x, y),
            origin: rect.size(),
            natural,
            profile: cx.profile.clone(),
            lock,
        });
        EventOutcome::Handled
    }

    fn drag(&mut self, x: f32, y: f32, cx: &mut Context<'_>) -> EventOutcome {
        let Some(session) = self.session.as_mut() else {
            return EventOutcome::Ignored;
        };
        session.last = (x, y);
        let live = session.size_at(x, y);
        log::trace!("live size {live:?}");
        cx.host.set_inline_size(cx.target.element, Some(&live.to_css()));
        cx.request_update();
        EventOutcome::Handled
    }

    fn commit(&mut self, at: Option<(f32, f32)>, cx: &mut Context<'_>) -> EventOutcome {
        let Some(session) = self.session.take() else {
            return EventOutcome::Ignored;
        };
        let (x, y) = at.unwrap_or(session.last);
        let size = session.size_at(x, y);
        let node = cx.target.node.id;
        let element = cx.target.element;

        let attrs: SmallVec<[(&str, Option<String>); 2]> = size
            .to_attributes()
            .into_iter()
            .map(|(name, value)| (name, Some(value)))
            .collect();
        if !attrs.is_empty() {
            cx.mark_self_write();
            cx.host.set_attributes(node, &attrs);
        }
        cx.host.set_inline_size(element, None);
        log::debug!("commit {node} {size:?}");

        if let Some(hook) = cx.config.hooks.on_change_size.clone() {
            hook(&cx.target.node, element, size);
        }

        session.lock.release(cx.host);
        cx.host.unsubscribe(Subscription::DocumentPointer);
        cx.request_update();
        EventOutcome::Handled
    }

    /// Drop an in-flight drag without committing.
    fn abort(&mut self, cx: &mut Context<'_>) {
        if let Some(session) = self.session.take() {
            log::debug!("drag aborted on {}", cx.target.node.id);
            cx.host.set_inline_size(cx.target.element, None);
            session.lock.release(cx.host);
            cx.host.unsubscribe(Subscription::DocumentPointer);
        }
    }
}

impl Capability for DragResize {
    fn name(&self) -> &str {
        "Resize"
    }

    fn mount(&mut self, cx: &mut Context<'_>) {
        for position in HandlePosition::ALL {
            cx.overlay.push_widget(OverlayWidget::Handle { position });
        }
    }

    fn unmount(&mut self, cx: &mut Context<'_>) {
        self.abort(cx);
        cx.overlay
            .remove_widgets(|w| matches!(w, OverlayWidget::Handle { .. }));
    }

    fn handle(&mut self, event: &InputEvent, cx: &mut Context<'_>) -> EventOutcome {
        match event {
            InputEvent::PointerDown {
                x,
                y,
                target: EventTarget::Handle(handle),
                ..
            } => self.begin(*handle, *x, *y, cx),
            InputEvent::PointerMove { x, y, .. } => self.drag(*x, *y, cx),
            InputEvent::PointerUp { x, y, .. } => self.commit(Some((*x, *y)), cx),
            InputEvent::PointerCancel => self.commit(None, cx),
            _ => EventOutcome::Ignored,
        }
    }
}

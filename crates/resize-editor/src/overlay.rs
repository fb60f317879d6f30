//! Overlay positioning engine.
//!
//! Owns the single floating layer drawn over the active target. The layer
//! is appended to a non-scrolling container while the target scrolls with
//! the editing root, so the placement carries a compensating top margin
//! that is refreshed on every root scroll.
//!
//! The overlay is a derived view model: it is recomputed from the target's
//! live geometry and pushed to the host with `Host::render_overlay`.

use crate::host::{Host, Subscription};
use resize_core::geometry::scroll_margin;
use resize_core::{ElementId, HandlePosition, OverlayPlacement, place_overlay};
use serde::Serialize;

/// A toolbar button as rendered in the overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolButton {
    pub id: String,
    /// `ql-resize-toolbar-<id>` for built-in tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<(String, String)>,
    pub active: bool,
}

/// The size readout shown by the DisplaySize capability.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeLabel {
    pub text: String,
    /// Inside the bottom-right corner, or outside when the target is small.
    pub inside: bool,
}

/// Something a capability placed on the overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OverlayWidget {
    Handle { position: HandlePosition },
    Toolbar { buttons: Vec<ToolButton> },
    SizeLabel(SizeLabel),
}

/// Rendered overlay: placement plus the widgets mounted into it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OverlayState {
    pub placement: OverlayPlacement,
    pub widgets: Vec<OverlayWidget>,
}

/// Owner of the floating layer. Shown ⇔ a target is active.
#[derive(Debug, Default)]
pub struct Overlay {
    state: Option<OverlayState>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_shown(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&OverlayState> {
        self.state.as_ref()
    }

    /// Create the layer for `target`. An existing layer is torn down first
    /// so its subscriptions never outlive the session that created them.
    pub fn show(&mut self, host: &mut dyn Host, target: ElementId) {
        if self.state.is_some() {
            self.hide(host);
        }

        host.set_selection(None);
        // Prevent spurious text selection while the overlay is up.
        host.set_user_select(false);

        self.state = Some(OverlayState::default());
        host.subscribe(Subscription::RootInput);
        host.subscribe(Subscription::RootScroll);

        self.reposition(host, Some(target));
    }

    /// Remove the layer and release its subscriptions. No-op when hidden.
    pub fn hide(&mut self, host: &mut dyn Host) {
        if self.state.take().is_none() {
            return;
        }
        host.render_overlay(None);
        host.unsubscribe(Subscription::RootInput);
        host.unsubscribe(Subscription::RootScroll);
        host.set_user_select(true);
    }

    /// Recompute placement from the target's live bounding box.
    /// No-op without a layer, a target, or target geometry.
    pub fn reposition(&mut self, host: &mut dyn Host, target: Option<ElementId>) {
        let (Some(state), Some(target)) = (self.state.as_mut(), target) else {
            return;
        };
        let Some(rect) = host.bounding_rect(target) else {
            return;
        };
        state.placement = place_overlay(rect, host.container_rect(), host.scroll_offset());
        log::trace!("overlay placed at {:?}", state.placement);
        host.render_overlay(Some(state));
    }

    /// Refresh only the scroll-compensating margin.
    pub fn sync_scroll(&mut self, host: &mut dyn Host) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        state.placement.margin_top = scroll_margin(host.scroll_offset());
        host.render_overlay(Some(state));
    }

    /// Add a widget. Ignored while hidden.
    pub fn push_widget(&mut self, widget: OverlayWidget) {
        if let Some(state) = self.state.as_mut() {
            state.widgets.push(widget);
        }
    }

    /// Remove every widget matching `pred`.
    pub fn remove_widgets(&mut self, pred: impl Fn(&OverlayWidget) -> bool) {
        if let Some(state) = self.state.as_mut() {
            state.widgets.retain(|w| !pred(w));
        }
    }

    /// Mutable access to the widgets, for in-place refreshes.
    pub fn widgets_mut(&mut self) -> Option<&mut Vec<OverlayWidget>> {
        self.state.as_mut().map(|s| &mut s.widgets)
    }

    /// Push the current state to the host without re-measuring.
    pub fn render(&self, host: &mut dyn Host) {
        if let Some(state) = self.state.as_ref() {
            host.render_overlay(Some(state));
        }
    }
}

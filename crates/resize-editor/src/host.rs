//! The host boundary.
//!
//! The controller never touches the editor's document model or the DOM
//! directly. Everything it needs is behind [`Host`], which the embedding
//! editor implements (see `resize-wasm` for the browser bridge and
//! [`crate::memory::MemoryHost`] for an in-memory one).
//!
//! ## Method groups
//!
//! | Group | Methods |
//! |-------|---------|
//! | Document | `find_node`, `element_of`, `node_offset`, `line_at`, `leaf_at`, attributes, formats |
//! | Selection | `selection`, `set_selection`, `focus` |
//! | Rendering | geometry, classes, cursors, inline size, overlay |
//! | Lifecycle | `subscribe`, `unsubscribe`, `dispatch_key`, `disable_native_resize` |

use crate::input::KeyEvent;
use crate::overlay::OverlayState;
use resize_core::{
    CssSize, Direction, ElementId, LineInfo, NodeId, NodeRef, Range, Rect, ScrollOffset, Size,
};

/// Origin of a document change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    User,
    Api,
    Silent,
}

/// Where a cursor override is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorScope {
    Body,
    Element(ElementId),
}

/// Event streams the engine listens to only while they are needed.
/// Every `subscribe` is paired with exactly one `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subscription {
    /// Document-level pointer move/up/cancel during a drag.
    DocumentPointer,
    /// Document-level key-down while the keyboard adapter is mounted.
    DocumentKeys,
    /// Root scroll while the overlay is shown.
    RootScroll,
    /// Root `input` while the overlay is shown.
    RootInput,
}

/// Capability interface of the host editor and rendering surface.
///
/// Change and selection notifications must be delivered to the controller
/// after the handler that caused them has returned, never from inside a
/// `Host` call.
pub trait Host {
    // ─── Document ────────────────────────────────────────────────────────

    /// Resolve a rendered element to its document node.
    fn find_node(&self, element: ElementId) -> Option<NodeRef>;

    /// The rendered element of a node.
    fn element_of(&self, node: NodeId) -> Option<ElementId>;

    /// Document index of the node's first character. `None` once removed.
    fn node_offset(&self, node: NodeId) -> Option<usize>;

    /// Length of the node in document characters (embeds are 1).
    fn node_length(&self, node: NodeId) -> usize;

    /// The line containing the character at `index`.
    fn line_at(&self, index: usize) -> Option<LineInfo>;

    /// The line before or after `line`.
    fn adjacent_line(&self, line: NodeId, direction: Direction) -> Option<LineInfo>;

    /// The leaf holding the character at `index`.
    fn leaf_at(&self, index: usize) -> Option<NodeRef>;

    /// Every leaf overlapping `range`, in document order.
    fn leaves_in(&self, range: Range) -> Vec<NodeRef>;

    /// Remove a node from the document.
    fn delete_node(&mut self, node: NodeId);

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Write several attributes as one change (one notification).
    /// `None` removes the attribute.
    fn set_attributes(&mut self, node: NodeId, attrs: &[(&str, Option<String>)]);

    /// Value of a named format at `index`.
    fn format_value(&self, index: usize, name: &str) -> Option<String>;

    /// Apply an inline format; `None` removes it.
    fn format_text(&mut self, index: usize, length: usize, name: &str, value: Option<&str>);

    /// Apply a block format; `None` removes it.
    fn format_line(&mut self, index: usize, length: usize, name: &str, value: Option<&str>);

    // ─── Selection ───────────────────────────────────────────────────────

    fn selection(&self) -> Option<Range>;

    fn set_selection(&mut self, range: Option<Range>);

    /// Give keyboard focus back to the editing surface.
    fn focus(&mut self);

    // ─── Rendering ───────────────────────────────────────────────────────

    /// The editing root element.
    fn root(&self) -> ElementId;

    fn bounding_rect(&self, element: ElementId) -> Option<Rect>;

    /// Bounding rect of the overlay's positioning container.
    fn container_rect(&self) -> Rect;

    fn scroll_offset(&self) -> ScrollOffset;

    /// Intrinsic media size (`naturalWidth`/`naturalHeight`), if any.
    fn intrinsic_size(&self, element: ElementId) -> Option<Size>;

    /// Point hit test (`document.elementFromPoint`).
    fn element_from_point(&self, x: f32, y: f32) -> Option<ElementId>;

    /// Toggle pointer-event suppression on embed tags inside the root.
    fn set_click_through(&mut self, enabled: bool);

    /// Set or clear the inline width/height style override.
    fn set_inline_size(&mut self, element: ElementId, size: Option<&CssSize>);

    fn add_class(&mut self, element: ElementId, class: &str);

    fn remove_class(&mut self, element: ElementId, class: &str);

    /// Force a cursor (`!important`) or clear the override with `None`.
    fn set_cursor(&mut self, scope: CursorScope, cursor: Option<&str>);

    /// Enable or disable text selection on the surface and document.
    fn set_user_select(&mut self, enabled: bool);

    /// Render the overlay, or remove it from the render tree with `None`.
    fn render_overlay(&mut self, overlay: Option<&OverlayState>);

    // ─── Lifecycle ───────────────────────────────────────────────────────

    fn subscribe(&mut self, _subscription: Subscription) {}

    fn unsubscribe(&mut self, _subscription: Subscription) {}

    /// Re-dispatch a key event into the editing root for default handling.
    fn dispatch_key(&mut self, _event: KeyEvent) {}

    /// Turn off the platform's own object-resizing affordance.
    fn disable_native_resize(&mut self) {}
}

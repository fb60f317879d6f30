//! Geometry primitives and overlay placement math.
//!
//! All coordinates are CSS pixels in viewport space, as reported by
//! `getBoundingClientRect()` on the host surface.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Check if a point is inside (right/bottom edges exclusive).
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Width × height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Scroll state of the editing surface.
///
/// `left` is the positioning container's horizontal scroll, `top` the
/// editing root's vertical scroll. The overlay lives in the container but
/// the target scrolls with the root, hence the split.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOffset {
    pub left: f32,
    pub top: f32,
}

/// Where the overlay is drawn, relative to its positioning container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayPlacement {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    /// Compensates root scrolling; recomputed on every scroll event.
    pub margin_top: f32,
}

/// Overlay border width; the overlay is shifted left by it so its border
/// sits on the target's edge rather than inside it.
pub const OVERLAY_BORDER: f32 = 1.0;

/// Compute the overlay placement for a target.
///
/// `left = target.left - container.left - border + scroll.left`
/// `top = target.top - container.top + scroll.top`, offset back by
/// `margin_top = -scroll.top` so the overlay tracks the target while the
/// root scrolls underneath a non-scrolling container.
pub fn place_overlay(target: Rect, container: Rect, scroll: ScrollOffset) -> OverlayPlacement {
    OverlayPlacement {
        left: target.left - container.left - OVERLAY_BORDER + scroll.left,
        top: target.top - container.top + scroll.top,
        width: target.width,
        height: target.height,
        margin_top: scroll_margin(scroll),
    }
}

/// The compensating top margin for a scroll state.
pub fn scroll_margin(scroll: ScrollOffset) -> f32 {
    if scroll.top == 0.0 { 0.0 } else { -scroll.top }
}

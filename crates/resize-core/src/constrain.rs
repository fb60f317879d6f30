//! Constraint resolver: drag delta + origin size + profile → valid size.
//!
//! Pure functions, no state. The drag engine calls [`resolve_drag`] on every
//! pointer move (rendered as inline CSS) and once more on release (written
//! as document attributes).

use crate::geometry::Size;
use crate::model::{ConstraintProfile, HandlePosition, ResolvedSize, SizeAttribute};

/// Smallest dimension the resolver will ever return when no minimum is set.
pub const MIN_DIMENSION: f32 = 1.0;

/// Apply a pointer delta to the origin size for the dragged handle.
/// Result is rounded to whole pixels.
pub fn drag_candidate(origin: Size, handle: HandlePosition, dx: f32, dy: f32) -> Size {
    let (sx, sy) = handle.sign();
    Size::new(
        (origin.width + dx * sx).round(),
        (origin.height + dy * sy).round(),
    )
}

/// Resolve a candidate size against a profile.
///
/// With a ratio, width is clamped first and height derived from it; if the
/// derived height breaks a height bound, height is pinned to that bound and
/// width re-derived. Without a ratio, each settable axis is clamped on its own.
/// Only settable attributes appear in the result.
pub fn resolve(candidate: Size, profile: &ConstraintProfile) -> ResolvedSize {
    let limit = &profile.limit;
    let mut width = candidate.width;
    let mut height = candidate.height;

    if let Some(ratio) = limit.effective_ratio() {
        width = clamp_axis(width, limit.min_width, limit.max_width).max(MIN_DIMENSION);
        height = (width * ratio).round();

        let bounded = clamp_axis(height, limit.min_height, limit.max_height);
        if bounded != height {
            height = bounded;
            width = (height / ratio).round();
        }
    } else {
        if profile.sets(SizeAttribute::Width) {
            width = clamp_axis(width, limit.min_width, limit.max_width).max(MIN_DIMENSION);
        }
        if profile.sets(SizeAttribute::Height) {
            height = clamp_axis(height, limit.min_height, limit.max_height).max(MIN_DIMENSION);
        }
    }

    if (width, height) != (candidate.width, candidate.height) {
        log::trace!(
            "clamped {}x{} to {width}x{height}",
            candidate.width,
            candidate.height
        );
    }

    ResolvedSize {
        width: profile.sets(SizeAttribute::Width).then_some(width),
        height: profile.sets(SizeAttribute::Height).then_some(height),
    }
}

/// Candidate + resolve in one step.
pub fn resolve_drag(
    origin: Size,
    handle: HandlePosition,
    dx: f32,
    dy: f32,
    profile: &ConstraintProfile,
) -> ResolvedSize {
    resolve(drag_candidate(origin, handle, dx, dy), profile)
}

/// Min then max; a malformed profile with `max < min` lets max win
/// instead of panicking like `f32::clamp`.
fn clamp_axis(value: f32, min: Option<f32>, max: Option<f32>) -> f32 {
    let mut v = value;
    if let Some(min) = min {
        v = v.max(min);
    }
    if let Some(max) = max {
        v = v.min(max);
    }
    v
}

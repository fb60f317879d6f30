pub mod constrain;
pub mod geometry;
pub mod id;
pub mod model;
pub mod natural;

pub use constrain::{drag_candidate, resolve, resolve_drag};
pub use geometry::{OverlayPlacement, Rect, ScrollOffset, Size, place_overlay};
pub use id::{ElementId, NodeId};
pub use model::*;
pub use natural::{NATURAL_SIZE_ATTR, format_natural_size, parse_natural_size};

//! Natural-size attribute codec.
//!
//! A node's intrinsic dimensions are recorded as `data-size="W,H"` so that
//! later resizes reference the original, unscaled size.

use crate::geometry::Size;
use winnow::ascii::{float, space0};
use winnow::combinator::{delimited, separated_pair};
use winnow::prelude::*;

/// Attribute name holding the cached natural size.
pub const NATURAL_SIZE_ATTR: &str = "data-size";

/// Parse a `"W,H"` attribute value. Whitespace around numbers is tolerated.
pub fn parse_natural_size(value: &str) -> Result<Size, String> {
    separated_pair(dimension, ',', dimension)
        .parse(value)
        .map(|(width, height)| Size::new(width, height))
        .map_err(|e| format!("Natural size parse error: {e}"))
}

/// Format a size as a `"W,H"` attribute value (whole pixels).
pub fn format_natural_size(size: Size) -> String {
    format!("{},{}", size.width.round(), size.height.round())
}

fn dimension(input: &mut &str) -> ModalResult<f32> {
    delimited(space0, float, space0).parse_next(input)
}

//! Size readout capability.

use crate::capability::{Capability, Context};
use crate::overlay::{OverlayWidget, SizeLabel};

/// Below either bound the label moves outside the target.
const INSIDE_MIN_WIDTH: f32 = 120.0;
const INSIDE_MIN_HEIGHT: f32 = 30.0;

/// Label for a rendered `width × height`.
pub fn size_label(width: f32, height: f32) -> SizeLabel {
    let (w, h) = (width.round(), height.round());
    SizeLabel {
        text: format!("{w} × {h}"),
        inside: w > INSIDE_MIN_WIDTH && h > INSIDE_MIN_HEIGHT,
    }
}

/// Shows the active element's rendered size on the overlay.
#[derive(Debug, Default)]
pub struct DisplaySize;

impl DisplaySize {
    pub fn new() -> Self {
        Self
    }

    fn refresh(&self, cx: &mut Context<'_>) {
        let label = cx
            .host
            .bounding_rect(cx.target.element)
            .map(|rect| size_label(rect.width, rect.height));
        let Some(label) = label else {
            cx.overlay
                .remove_widgets(|w| matches!(w, OverlayWidget::SizeLabel(_)));
            return;
        };

        let Some(widgets) = cx.overlay.widgets_mut() else {
            return;
        };
        let label = OverlayWidget::SizeLabel(label);
        match widgets
            .iter()
            .position(|w| matches!(w, OverlayWidget::SizeLabel(_)))
        {
            Some(at) => widgets[at] = label,
            None => widgets.push(label),
        }
    }
}

impl Capability for DisplaySize {
    fn name(&self) -> &str {
        "DisplaySize"
    }

    fn mount(&mut self, cx: &mut Context<'_>) {
        self.refresh(cx);
    }

    fn unmount(&mut self, cx: &mut Context<'_>) {
        cx.overlay
            .remove_widgets(|w| matches!(w, OverlayWidget::SizeLabel(_)));
    }

    fn update(&mut self, cx: &mut Context<'_>) {
        self.refresh(cx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn label_text_uses_rounded_pixels() {
        assert_eq!(size_label(250.4, 149.6).text, "250 × 150");
    }

    #[test]
    fn small_targets_get_an_outside_label() {
        assert!(size_label(300.0, 200.0).inside);
        assert!(!size_label(120.0, 200.0).inside);
        assert!(!size_label(300.0, 30.0).inside);
    }
}

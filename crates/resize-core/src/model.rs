//! Data model shared by the controller and its capabilities.
//!
//! Nodes are owned by the host document; this crate only describes them
//! (`NodeRef`) and the per-type rules that bound how they may be resized
//! (`ConstraintProfile`).

use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

// ─── Nodes ───────────────────────────────────────────────────────────────

/// Formatting scope of a node: inline leaves sit inside a text line,
/// block nodes occupy a whole line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeScope {
    #[default]
    Inline,
    Block,
}

/// A resolved document node: identity plus its type key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: NodeId,
    /// Node-type key (blot name), e.g. `"image"` or `"video"`.
    pub kind: String,
    #[serde(default)]
    pub scope: NodeScope,
}

impl NodeRef {
    pub fn new(id: NodeId, kind: impl Into<String>, scope: NodeScope) -> Self {
        Self {
            id,
            kind: kind.into(),
            scope,
        }
    }
}

/// A line (block) of the document as seen from a document index.
#[derive(Debug, Clone, PartialEq)]
pub struct LineInfo {
    pub node: NodeRef,
    /// Document index of the first character of the line.
    pub offset: usize,
    /// Length including the trailing newline.
    pub length: usize,
    /// `true` for a plain text block, whose length counts its newline.
    pub is_text_block: bool,
}

/// A document selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Range {
    pub index: usize,
    pub length: usize,
}

impl Range {
    pub const fn caret(index: usize) -> Self {
        Self { index, length: 0 }
    }

    pub const fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }
}

/// Vertical direction for line traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

// ─── Constraint profiles ─────────────────────────────────────────────────

/// A node attribute the resizer may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeAttribute {
    Width,
    Height,
}

impl SizeAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Height => "height",
        }
    }
}

/// Bounds on resizable dimensions. Every bound is optional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SizeLimit {
    pub min_width: Option<f32>,
    pub max_width: Option<f32>,
    pub min_height: Option<f32>,
    pub max_height: Option<f32>,
    /// Fixed aspect ratio, `height / width`. Non-positive values are ignored.
    pub ratio: Option<f32>,
}

impl SizeLimit {
    /// The aspect ratio, if configured and usable.
    pub fn effective_ratio(&self) -> Option<f32> {
        self.ratio.filter(|r| r.is_finite() && *r > 0.0)
    }
}

/// Per-node-type resize rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintProfile {
    /// Attributes written on commit. Empty means width only.
    #[serde(default, alias = "attribute")]
    pub attributes: SmallVec<[SizeAttribute; 2]>,
    #[serde(default)]
    pub limit: SizeLimit,
}

impl Default for ConstraintProfile {
    fn default() -> Self {
        Self {
            attributes: smallvec![SizeAttribute::Width],
            limit: SizeLimit::default(),
        }
    }
}

impl ConstraintProfile {
    pub fn new(attributes: &[SizeAttribute], limit: SizeLimit) -> Self {
        Self {
            attributes: attributes.iter().copied().collect(),
            limit,
        }
    }

    /// Whether the profile allows writing this attribute.
    pub fn sets(&self, attr: SizeAttribute) -> bool {
        if self.attributes.is_empty() {
            return attr == SizeAttribute::Width;
        }
        self.attributes.contains(&attr)
    }
}

// ─── Resolved sizes ──────────────────────────────────────────────────────

/// Output of the constraint resolver: only settable dimensions are present.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResolvedSize {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
}

impl ResolvedSize {
    /// Pixel-suffixed form for inline styles during a live drag.
    pub fn to_css(&self) -> CssSize {
        CssSize {
            width: self.width.map(|w| format!("{w}px")),
            height: self.height.map(|h| format!("{h}px")),
        }
    }

    /// Attribute name/value pairs for committing to the document.
    pub fn to_attributes(&self) -> SmallVec<[(&'static str, String); 2]> {
        let mut out = SmallVec::new();
        if let Some(w) = self.width {
            out.push((SizeAttribute::Width.as_str(), format!("{w}")));
        }
        if let Some(h) = self.height {
            out.push((SizeAttribute::Height.as_str(), format!("{h}")));
        }
        out
    }
}

/// Inline-style size with CSS units.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CssSize {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

// ─── Overlay affordances ─────────────────────────────────────────────────

/// Corner position of a resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandlePosition {
    #[serde(rename = "tl")]
    TopLeft,
    #[serde(rename = "tr")]
    TopRight,
    #[serde(rename = "br")]
    BottomRight,
    #[serde(rename = "bl")]
    BottomLeft,
}

impl HandlePosition {
    /// Creation order of the four handles.
    pub const ALL: [HandlePosition; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomRight,
        Self::BottomLeft,
    ];

    /// Short class name (`tl`, `tr`, `br`, `bl`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "tl",
            Self::TopRight => "tr",
            Self::BottomRight => "br",
            Self::BottomLeft => "bl",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "tl" => Some(Self::TopLeft),
            "tr" => Some(Self::TopRight),
            "br" => Some(Self::BottomRight),
            "bl" => Some(Self::BottomLeft),
            _ => None,
        }
    }

    /// Delta sign per axis. Only the left/right edge matters: left handles
    /// invert both deltas, right handles keep them.
    pub fn sign(&self) -> (f32, f32) {
        if self.is_left() {
            (-1.0, -1.0)
        } else {
            (1.0, 1.0)
        }
    }

    pub fn is_left(&self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    /// CSS cursor shown while hovering or dragging this handle.
    pub fn cursor(&self) -> &'static str {
        match self {
            Self::TopLeft | Self::BottomRight => "nwse-resize",
            Self::TopRight | Self::BottomLeft => "nesw-resize",
        }
    }
}

/// Alignment classes applied by the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Full,
}

impl Alignment {
    pub fn as_class(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Full => "full",
        }
    }

    pub fn from_class(class: &str) -> Option<Self> {
        match class {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            "full" => Some(Self::Full),
            _ => None,
        }
    }
}

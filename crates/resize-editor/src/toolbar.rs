//! Toolbar capability: alignment and action buttons on the overlay.
//!
//! Alignment tools toggle a class-valued format on the active node:
//! `resize-inline` for inline nodes, `resize-block` for block nodes.
//! Clicking the already-applied alignment removes it.

use crate::capability::{Capability, Context, EventOutcome};
use crate::input::{EventTarget, InputEvent};
use crate::overlay::{OverlayWidget, ToolButton};
use resize_core::{Alignment, ElementId, NodeRef, NodeScope};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Format name for inline-scoped alignment.
pub const INLINE_FORMAT: &str = "resize-inline";
/// Format name for block-scoped alignment.
pub const BLOCK_FORMAT: &str = "resize-block";

/// What a custom handler wants to happen after it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolFlow {
    /// Fall through to the default apply/unapply.
    Continue,
    Stop,
}

pub type ToolVerify = Rc<dyn Fn(&NodeRef, ElementId) -> bool>;
pub type ToolApplied = Rc<dyn Fn(&Context<'_>) -> bool>;
pub type ToolHandler = Rc<dyn Fn(&mut Context<'_>) -> ToolFlow>;

/// Declarative description of a toolbar button.
#[derive(Clone, Default)]
pub struct ToolDescriptor {
    pub id: String,
    /// Format value applied on click.
    pub tool_class: Option<String>,
    /// Styling hook for the rendered button.
    pub class_name: Option<String>,
    pub icon: Option<String>,
    pub text: Option<String>,
    pub attrs: Vec<(String, String)>,
    /// Hides the button for targets where it returns `false`.
    pub verify: Option<ToolVerify>,
    /// Overrides the default "format equals `tool_class`" check.
    pub is_applied: Option<ToolApplied>,
    pub handler: Option<ToolHandler>,
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("id", &self.id)
            .field("tool_class", &self.tool_class)
            .field("verify", &self.verify.is_some())
            .field("is_applied", &self.is_applied.is_some())
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

impl ToolDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.tool_class = Some(class.into());
        self
    }

    pub fn with_verify(mut self, verify: impl Fn(&NodeRef, ElementId) -> bool + 'static) -> Self {
        self.verify = Some(Rc::new(verify));
        self
    }

    pub fn with_handler(mut self, handler: impl Fn(&mut Context<'_>) -> ToolFlow + 'static) -> Self {
        self.handler = Some(Rc::new(handler));
        self
    }

    fn visible_for(&self, node: &NodeRef, element: ElementId) -> bool {
        self.verify.as_ref().is_none_or(|verify| verify(node, element))
    }

    fn applied(&self, cx: &Context<'_>) -> bool {
        if let Some(is_applied) = &self.is_applied {
            return is_applied(cx);
        }
        match &self.tool_class {
            Some(class) => current_format(cx) == *class,
            None => false,
        }
    }
}

/// Built-in tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTool {
    Left,
    Center,
    Right,
    Full,
    Edit,
}

impl BuiltinTool {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            "full" => Some(Self::Full),
            "edit" => Some(Self::Edit),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Full => "full",
            Self::Edit => "edit",
        }
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        let mut tool = ToolDescriptor::new(self.name());
        tool.class_name = Some(format!("ql-resize-toolbar-{}", self.name()));
        let alignment = match self {
            Self::Left => Some(Alignment::Left),
            Self::Center => Some(Alignment::Center),
            Self::Right => Some(Alignment::Right),
            Self::Full => Some(Alignment::Full),
            Self::Edit => None,
        };
        match alignment {
            Some(alignment) => tool.with_class(alignment.as_class()),
            None => tool.with_handler(|cx| {
                cx.request_edit();
                ToolFlow::Stop
            }),
        }
    }
}

/// One entry of the configured tool list.
#[derive(Debug, Clone)]
pub enum ToolSpec {
    Builtin(BuiltinTool),
    Custom(ToolDescriptor),
}

impl ToolSpec {
    pub fn descriptor(&self) -> ToolDescriptor {
        match self {
            Self::Builtin(tool) => tool.descriptor(),
            Self::Custom(tool) => tool.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTool {
    Name(String),
    Custom(RawCustomTool),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCustomTool {
    id: Option<String>,
    tool_class: Option<String>,
    icon: Option<String>,
    text: Option<String>,
    #[serde(default)]
    attrs: BTreeMap<String, String>,
}

impl<'de> Deserialize<'de> for ToolSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawTool::deserialize(deserializer)? {
            RawTool::Name(name) => BuiltinTool::from_name(&name)
                .map(Self::Builtin)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown tool: {name}"))),
            RawTool::Custom(raw) => {
                let id = raw
                    .id
                    .or_else(|| raw.tool_class.clone())
                    .unwrap_or_else(|| "custom".to_string());
                Ok(Self::Custom(ToolDescriptor {
                    id,
                    tool_class: raw.tool_class,
                    icon: raw.icon,
                    text: raw.text,
                    attrs: raw.attrs.into_iter().collect(),
                    ..ToolDescriptor::default()
                }))
            }
        }
    }
}

// ─── Format access ───────────────────────────────────────────────────────

/// Current alignment format of the active node, or `""`.
pub fn current_format(cx: &Context<'_>) -> String {
    let Some(index) = cx.host.node_offset(cx.target.node.id) else {
        return String::new();
    };
    let name = match cx.target.node.scope {
        NodeScope::Inline => INLINE_FORMAT,
        NodeScope::Block => BLOCK_FORMAT,
    };
    cx.host.format_value(index, name).unwrap_or_default()
}

/// Apply (or with `None`, remove) the alignment format on the active node.
pub fn apply_format(cx: &mut Context<'_>, value: Option<&str>) {
    let Some(index) = cx.host.node_offset(cx.target.node.id) else {
        return;
    };
    cx.mark_self_write();
    match cx.target.node.scope {
        NodeScope::Inline => cx.host.format_text(index, 1, INLINE_FORMAT, value),
        NodeScope::Block => cx.host.format_line(index, 1, BLOCK_FORMAT, value),
    }
}

// ─── Capability ──────────────────────────────────────────────────────────

/// Toolbar capability.
#[derive(Default)]
pub struct Toolbar {
    tools: Vec<ToolDescriptor>,
}

impl Toolbar {
    pub fn new() -> Self {
        Self::default()
    }

    fn buttons(&self, cx: &Context<'_>) -> Vec<ToolButton> {
        self.tools
            .iter()
            .map(|tool| ToolButton {
                id: tool.id.clone(),
                class_name: tool.class_name.clone(),
                icon: tool.icon.clone(),
                text: tool.text.clone(),
                attrs: tool.attrs.clone(),
                active: tool.applied(cx),
            })
            .collect()
    }

    fn refresh(&self, cx: &mut Context<'_>) {
        let buttons = self.buttons(cx);
        if let Some(widgets) = cx.overlay.widgets_mut() {
            for widget in widgets.iter_mut() {
                if let OverlayWidget::Toolbar { buttons: current } = widget {
                    *current = buttons.clone();
                }
            }
        }
    }

    fn click(tool: &ToolDescriptor, cx: &mut Context<'_>) {
        if let Some(handler) = &tool.handler
            && handler(cx) == ToolFlow::Stop
        {
            return;
        }

        if tool.applied(cx) {
            apply_format(cx, None);
        } else if let Some(class) = &tool.tool_class {
            apply_format(cx, Some(class));
        }

        // The node may have moved; redraw handles and readouts.
        cx.request_update();
    }
}

impl Capability for Toolbar {
    fn name(&self) -> &str {
        "Toolbar"
    }

    fn mount(&mut self, cx: &mut Context<'_>) {
        let node = cx.target.node.clone();
        let element = cx.target.element;
        self.tools = cx
            .config
            .tools
            .iter()
            .map(ToolSpec::descriptor)
            .filter(|tool| tool.visible_for(&node, element))
            .collect();
        let buttons = self.buttons(cx);
        cx.overlay.push_widget(OverlayWidget::Toolbar { buttons });
    }

    fn unmount(&mut self, cx: &mut Context<'_>) {
        cx.overlay
            .remove_widgets(|w| matches!(w, OverlayWidget::Toolbar { .. }));
        self.tools.clear();
    }

    fn update(&mut self, cx: &mut Context<'_>) {
        self.refresh(cx);
    }

    fn handle(&mut self, event: &InputEvent, cx: &mut Context<'_>) -> EventOutcome {
        let InputEvent::PointerDown {
            target: EventTarget::ToolButton(id),
            ..
        } = event
        else {
            return EventOutcome::Ignored;
        };
        let Some(tool) = self.tools.iter().find(|t| t.id == *id).cloned() else {
            return EventOutcome::Ignored;
        };
        log::debug!("toolbar click {id} on {}", cx.target.node.id);
        Self::click(&tool, cx);
        self.refresh(cx);
        EventOutcome::Handled
    }
}

//! Configuration: defaults, user overrides, and collaborator hooks.
//!
//! User options are merged over the defaults field by field. List-valued
//! options (capabilities, embed tags, tools) and the profile map replace
//! the default wholesale when present.

use crate::capability::{CapabilityKind, CapabilitySpec};
use crate::toolbar::{BuiltinTool, ToolSpec};
use resize_core::{ConstraintProfile, ElementId, NodeRef, ResolvedSize, SizeAttribute, SizeLimit};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Called with the node and element on activation / deactivation.
pub type TargetHook = Rc<dyn Fn(&NodeRef, ElementId)>;

/// Called with the committed size after a drag.
pub type SizeHook = Rc<dyn Fn(&NodeRef, ElementId, ResolvedSize)>;

/// Optional collaborator callbacks, invoked synchronously.
#[derive(Clone, Default)]
pub struct Hooks {
    pub on_active: Option<TargetHook>,
    pub on_inactive: Option<TargetHook>,
    pub on_change_size: Option<SizeHook>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_active", &self.on_active.is_some())
            .field("on_inactive", &self.on_inactive.is_some())
            .field("on_change_size", &self.on_change_size.is_some())
            .finish()
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct ResizeConfig {
    pub capabilities: Vec<CapabilitySpec>,
    /// Activate embeds when arrow keys cross them.
    pub keyboard_select: bool,
    /// Marker for nodes inside the text selection.
    pub selected_class: Option<String>,
    /// Marker for the pointer-activated node.
    pub active_class: Option<String>,
    /// Element tags treated as click-through for hit testing.
    pub embed_tags: Vec<String>,
    pub tools: Vec<ToolSpec>,
    /// Node-type key → resize rules. No profile, no activation.
    pub constraint_profiles: HashMap<String, ConstraintProfile>,
    /// Also write the natural-size cache to the node's `data-size`.
    pub persist_natural_size: bool,
    pub hooks: Hooks,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        let mut constraint_profiles = HashMap::new();
        constraint_profiles.insert(
            "image".to_string(),
            ConstraintProfile::new(
                &[SizeAttribute::Width],
                SizeLimit {
                    min_width: Some(100.0),
                    ..SizeLimit::default()
                },
            ),
        );
        constraint_profiles.insert(
            "video".to_string(),
            ConstraintProfile::new(
                &[SizeAttribute::Width, SizeAttribute::Height],
                SizeLimit {
                    min_width: Some(200.0),
                    ratio: Some(0.5625),
                    ..SizeLimit::default()
                },
            ),
        );

        Self {
            capabilities: vec![
                CapabilitySpec::Builtin(CapabilityKind::DisplaySize),
                CapabilitySpec::Builtin(CapabilityKind::Toolbar),
                CapabilitySpec::Builtin(CapabilityKind::Resize),
                CapabilitySpec::Builtin(CapabilityKind::Keyboard),
            ],
            keyboard_select: true,
            selected_class: Some("selected".to_string()),
            active_class: Some("active".to_string()),
            embed_tags: vec!["VIDEO".to_string(), "IFRAME".to_string()],
            tools: vec![
                ToolSpec::Builtin(BuiltinTool::Left),
                ToolSpec::Builtin(BuiltinTool::Center),
                ToolSpec::Builtin(BuiltinTool::Right),
                ToolSpec::Builtin(BuiltinTool::Full),
                ToolSpec::Builtin(BuiltinTool::Edit),
            ],
            constraint_profiles,
            persist_natural_size: true,
            hooks: Hooks::default(),
        }
    }
}

/// User-supplied options. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserConfig {
    #[serde(alias = "modules")]
    pub capabilities: Option<Vec<CapabilitySpec>>,
    pub keyboard_select: Option<bool>,
    /// An empty string disables the marker.
    pub selected_class: Option<String>,
    /// An empty string disables the marker.
    pub active_class: Option<String>,
    pub embed_tags: Option<Vec<String>>,
    pub tools: Option<Vec<ToolSpec>>,
    #[serde(alias = "parchment")]
    pub constraint_profiles: Option<HashMap<String, ConstraintProfile>>,
    pub persist_natural_size: Option<bool>,
    #[serde(skip)]
    pub hooks: Option<Hooks>,
}

impl ResizeConfig {
    /// Merge user options over `self`.
    pub fn merged(mut self, user: UserConfig) -> Self {
        if let Some(capabilities) = user.capabilities {
            self.capabilities = capabilities;
        }
        if let Some(keyboard_select) = user.keyboard_select {
            self.keyboard_select = keyboard_select;
        }
        if let Some(class) = user.selected_class {
            self.selected_class = non_empty(class);
        }
        if let Some(class) = user.active_class {
            self.active_class = non_empty(class);
        }
        if let Some(tags) = user.embed_tags {
            self.embed_tags = tags;
        }
        if let Some(tools) = user.tools {
            self.tools = tools;
        }
        if let Some(profiles) = user.constraint_profiles {
            self.constraint_profiles = profiles;
        }
        if let Some(persist) = user.persist_natural_size {
            self.persist_natural_size = persist;
        }
        if let Some(hooks) = user.hooks {
            self.hooks = hooks;
        }
        self
    }

    /// Parse JSON options and merge them over the defaults.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let user: UserConfig =
            serde_json::from_str(json).map_err(|e| format!("Config parse error: {e}"))?;
        Ok(Self::default().merged(user))
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn profile(&self, kind: &str) -> Option<&ConstraintProfile> {
        self.constraint_profiles.get(kind)
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

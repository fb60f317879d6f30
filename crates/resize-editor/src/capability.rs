//! Capability registry and lifecycle.
//!
//! A capability is a pluggable unit of behavior mounted while a target is
//! active. The registry instantiates the configured list on activation,
//! mounts in list order, and unmounts in reverse order on deactivation.
//!
//! Capabilities reach the controller through a [`Context`] built for each
//! call: the host, the active target and its profile, the overlay, and a
//! request sink. Requests (update, deactivate, activate another node, edit)
//! are applied by the controller once the capability call has returned.

use crate::config::ResizeConfig;
use crate::controller::eligible_element;
use crate::display_size::DisplaySize;
use crate::host::Host;
use crate::input::InputEvent;
use crate::keyboard::Keyboard;
use crate::overlay::Overlay;
use crate::resize::{DragResize, NaturalSizes};
use crate::toolbar::Toolbar;
use resize_core::{ConstraintProfile, ElementId, NodeRef};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::rc::Rc;

/// Whether an event was consumed. `Handled` ⇒ prevent the default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Handled,
    Ignored,
}

impl EventOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled)
    }
}

/// The node currently selected for resize/format interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTarget {
    pub node: NodeRef,
    pub element: ElementId,
}

/// Deferred requests from capabilities to the controller.
#[derive(Debug, Default)]
pub(crate) struct Requests {
    pub update: bool,
    pub deactivate: bool,
    pub activate: Option<(NodeRef, ElementId)>,
    pub edit: bool,
    pub self_write: bool,
}

/// Everything a capability may touch during one call.
pub struct Context<'a> {
    pub host: &'a mut dyn Host,
    pub target: &'a ActiveTarget,
    pub profile: &'a ConstraintProfile,
    pub overlay: &'a mut Overlay,
    pub config: &'a ResizeConfig,
    pub natural_sizes: &'a mut NaturalSizes,
    pub(crate) requests: &'a mut Requests,
}

impl Context<'_> {
    /// Reposition the overlay and broadcast `update` to all capabilities.
    pub fn request_update(&mut self) {
        self.requests.update = true;
    }

    pub fn request_deactivate(&mut self) {
        self.requests.deactivate = true;
    }

    /// Switch activation to another node.
    pub fn request_activate(&mut self, node: NodeRef, element: ElementId) {
        self.requests.activate = Some((node, element));
    }

    /// Hand control back to text editing at the target's position.
    pub fn request_edit(&mut self) {
        self.requests.edit = true;
    }

    /// Flag the next document change notification as self-originated.
    pub fn mark_self_write(&mut self) {
        self.requests.self_write = true;
    }

    /// The element to activate for `node`, if it is eligible.
    pub fn eligible(&self, node: &NodeRef) -> Option<ElementId> {
        let element = self.host.element_of(node.id)?;
        eligible_element(&*self.host, self.config, node, element)
    }
}

/// A pluggable behavior mounted while a target is active.
pub trait Capability {
    fn name(&self) -> &str;

    /// Called once after activation, in configured order.
    fn mount(&mut self, cx: &mut Context<'_>);

    /// Called once before deactivation, in reverse order. Must release
    /// every subscription the capability holds.
    fn unmount(&mut self, cx: &mut Context<'_>);

    /// The target's geometry or formatting may have changed.
    fn update(&mut self, _cx: &mut Context<'_>) {}

    /// Offer an input event.
    fn handle(&mut self, _event: &InputEvent, _cx: &mut Context<'_>) -> EventOutcome {
        EventOutcome::Ignored
    }
}

// ─── Capability specs ────────────────────────────────────────────────────

/// Built-in capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    DisplaySize,
    Toolbar,
    Resize,
    Keyboard,
}

impl CapabilityKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "DisplaySize" | "displaySize" => Some(Self::DisplaySize),
            "Toolbar" | "toolbar" => Some(Self::Toolbar),
            "Resize" | "resize" => Some(Self::Resize),
            "Keyboard" | "keyboard" => Some(Self::Keyboard),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::DisplaySize => "DisplaySize",
            Self::Toolbar => "Toolbar",
            Self::Resize => "Resize",
            Self::Keyboard => "Keyboard",
        }
    }

    pub fn instantiate(&self) -> Box<dyn Capability> {
        match self {
            Self::DisplaySize => Box::new(DisplaySize::new()),
            Self::Toolbar => Box::new(Toolbar::new()),
            Self::Resize => Box::new(DragResize::new()),
            Self::Keyboard => Box::new(Keyboard::new()),
        }
    }
}

/// Factory for caller-supplied capabilities.
pub type CapabilityFactory = Rc<dyn Fn() -> Box<dyn Capability>>;

/// One entry of the configured capability list.
#[derive(Clone)]
pub enum CapabilitySpec {
    Builtin(CapabilityKind),
    Custom(CapabilityFactory),
}

impl CapabilitySpec {
    pub fn custom(factory: impl Fn() -> Box<dyn Capability> + 'static) -> Self {
        Self::Custom(Rc::new(factory))
    }

    pub fn instantiate(&self) -> Box<dyn Capability> {
        match self {
            Self::Builtin(kind) => kind.instantiate(),
            Self::Custom(factory) => factory(),
        }
    }
}

impl fmt::Debug for CapabilitySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(kind) => write!(f, "{}", kind.name()),
            Self::Custom(_) => write!(f, "<custom>"),
        }
    }
}

impl<'de> Deserialize<'de> for CapabilitySpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        CapabilityKind::from_name(&name)
            .map(Self::Builtin)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown capability: {name}")))
    }
}

// ─── Registry ────────────────────────────────────────────────────────────

/// The mounted capability instances of the current activation.
#[derive(Default)]
pub struct CapabilityRegistry {
    instances: Vec<Box<dyn Capability>>,
}

impl CapabilityRegistry {
    /// One instance per spec, in order.
    pub fn instantiate(specs: &[CapabilitySpec]) -> Self {
        Self {
            instances: specs.iter().map(CapabilitySpec::instantiate).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.instances.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn mount_all(&mut self, cx: &mut Context<'_>) {
        for capability in self.instances.iter_mut() {
            log::trace!("mount {}", capability.name());
            capability.mount(cx);
        }
    }

    /// Unmount in reverse order and drop every instance.
    pub fn unmount_all(&mut self, cx: &mut Context<'_>) {
        while let Some(mut capability) = self.instances.pop() {
            log::trace!("unmount {}", capability.name());
            capability.unmount(cx);
        }
    }

    pub fn update_all(&mut self, cx: &mut Context<'_>) {
        for capability in self.instances.iter_mut() {
            capability.update(cx);
        }
    }

    /// Offer an event to each capability in mount order; first taker wins.
    pub fn dispatch(&mut self, event: &InputEvent, cx: &mut Context<'_>) -> EventOutcome {
        for capability in self.instances.iter_mut() {
            if capability.handle(event, cx).is_handled() {
                return EventOutcome::Handled;
            }
        }
        EventOutcome::Ignored
    }
}

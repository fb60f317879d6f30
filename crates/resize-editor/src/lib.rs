pub mod capability;
pub mod config;
pub mod controller;
pub mod display_size;
pub mod host;
pub mod input;
pub mod keyboard;
pub mod memory;
pub mod overlay;
pub mod resize;
pub mod toolbar;

pub use capability::{
    ActiveTarget, Capability, CapabilityKind, CapabilityRegistry, CapabilitySpec, Context,
    EventOutcome,
};
pub use config::{Hooks, ResizeConfig, UserConfig};
pub use controller::{ResizeController, eligible_element};
pub use host::{ChangeSource, CursorScope, Host, Subscription};
pub use input::{EventTarget, InputEvent, Key, KeyEvent, Modifiers, PointerKind};
pub use memory::{Leaf, MemoryHost};
pub use overlay::{Overlay, OverlayState, OverlayWidget, SizeLabel, ToolButton};
pub use toolbar::{BuiltinTool, ToolDescriptor, ToolFlow, ToolSpec};

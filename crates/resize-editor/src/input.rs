//! Input abstraction layer.
//!
//! Normalizes mouse, touch, and keyboard events from the host surface
//! into a unified `InputEvent` enum consumed by the controller and its
//! capabilities. Touch events are reduced to their first changed touch
//! by the bridge before they get here.

use resize_core::{ElementId, HandlePosition};

/// Modifier keys held during an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Shift, Ctrl or Alt: combos reserved for host shortcuts.
    pub fn reserved(&self) -> bool {
        self.shift || self.ctrl || self.alt
    }
}

/// Which device produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
}

/// What a pointer event landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTarget {
    /// The editing root itself (possibly a click-through over an embed).
    Root,
    /// An element inside the editing surface.
    Element(ElementId),
    /// The overlay body.
    Overlay,
    /// A resize handle on the overlay.
    Handle(HandlePosition),
    /// A toolbar button, by tool id.
    ToolButton(String),
    /// Anywhere outside the editing surface and overlay.
    Outside,
}

/// Logical keys the navigation adapter cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Backspace,
    Tab,
    Enter,
    Escape,
    Left,
    Up,
    Right,
    Down,
    Delete,
    Other(String),
}

impl Key {
    /// From a `KeyboardEvent.key` value.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Backspace" => Self::Backspace,
            "Tab" => Self::Tab,
            "Enter" => Self::Enter,
            "Escape" => Self::Escape,
            "ArrowLeft" => Self::Left,
            "ArrowUp" => Self::Up,
            "ArrowRight" => Self::Right,
            "ArrowDown" => Self::Down,
            "Delete" => Self::Delete,
            other => Self::Other(other.to_string()),
        }
    }

    /// From a legacy `KeyboardEvent.keyCode`.
    pub fn from_code(code: u32) -> Self {
        match code {
            8 => Self::Backspace,
            9 => Self::Tab,
            13 => Self::Enter,
            27 => Self::Escape,
            37 => Self::Left,
            38 => Self::Up,
            39 => Self::Right,
            40 => Self::Down,
            46 => Self::Delete,
            other => Self::Other(format!("#{other}")),
        }
    }

    /// The `KeyboardEvent.key` value to re-dispatch with.
    pub fn name(&self) -> &str {
        match self {
            Self::Backspace => "Backspace",
            Self::Tab => "Tab",
            Self::Enter => "Enter",
            Self::Escape => "Escape",
            Self::Left => "ArrowLeft",
            Self::Up => "ArrowUp",
            Self::Right => "ArrowRight",
            Self::Down => "ArrowDown",
            Self::Delete => "Delete",
            Self::Other(name) => name,
        }
    }

    pub fn is_arrow(&self) -> bool {
        matches!(self, Self::Left | Self::Right | Self::Up | Self::Down)
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Backspace | Self::Delete)
    }
}

/// A key-down event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    /// The event already had `preventDefault()` called on it.
    pub default_prevented: bool,
    /// Re-dispatched by the navigation adapter itself.
    pub synthetic: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
            default_prevented: false,
            synthetic: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A normalized input event from the host surface.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start).
    PointerDown {
        x: f32,
        y: f32,
        target: EventTarget,
        pointer: PointerKind,
        modifiers: Modifiers,
    },

    /// Pointer moved anywhere in the document.
    PointerMove { x: f32, y: f32, pointer: PointerKind },

    /// Pointer released anywhere in the document.
    PointerUp { x: f32, y: f32, target: EventTarget },

    /// Touch cancelled; carries no coordinates.
    PointerCancel,

    /// Double click.
    DoubleClick { target: EventTarget },

    /// Key pressed (document-level, capture phase).
    Key(KeyEvent),

    /// The editing root scrolled.
    Scroll,

    /// The editing root received an `input` event (typing, paste, drop).
    RootInput,
}

impl InputEvent {
    /// A mouse press with no modifiers.
    pub fn pointer_down(x: f32, y: f32, target: EventTarget) -> Self {
        Self::PointerDown {
            x,
            y,
            target,
            pointer: PointerKind::Mouse,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        Self::PointerMove {
            x,
            y,
            pointer: PointerKind::Mouse,
        }
    }

    pub fn pointer_up(x: f32, y: f32, target: EventTarget) -> Self {
        Self::PointerUp { x, y, target }
    }

    /// Extract position if this is a pointer event with coordinates.
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. } => Some((*x, *y)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_and_codes_agree() {
        let pairs = [
            ("Backspace", 8),
            ("Enter", 13),
            ("ArrowLeft", 37),
            ("ArrowUp", 38),
            ("ArrowRight", 39),
            ("ArrowDown", 40),
            ("Delete", 46),
        ];
        for (name, code) in pairs {
            assert_eq!(Key::from_name(name), Key::from_code(code), "{name}");
            assert_eq!(Key::from_code(code).name(), name);
        }
    }

    #[test]
    fn unknown_keys_are_other() {
        assert_eq!(Key::from_name("a"), Key::Other("a".into()));
        assert!(!Key::from_code(65).is_arrow());
    }

    #[test]
    fn reserved_modifiers_exclude_meta() {
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert!(!meta.reserved());
        let alt = Modifiers {
            alt: true,
            ..Modifiers::NONE
        };
        assert!(alt.reserved());
    }

    #[test]
    fn cancel_has_no_position() {
        assert_eq!(InputEvent::PointerCancel.position(), None);
        assert_eq!(
            InputEvent::pointer_up(3.0, 4.0, EventTarget::Outside).position(),
            Some((3.0, 4.0))
        );
    }
}

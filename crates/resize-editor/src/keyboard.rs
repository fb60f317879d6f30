//! Keyboard navigation.
//!
//! Two pieces:
//!
//! - [`Keyboard`], a capability that listens for key-down while a target is
//!   active. Delete/Backspace removes the node; arrows move off it, onto an
//!   eligible neighbor when there is one.
//! - [`navigation_target`], the arrow-key interceptor consulted before the
//!   host moves the caret, so that crossing an eligible node activates it
//!   instead of skipping over it.

use crate::capability::{Capability, Context, EventOutcome};
use crate::config::ResizeConfig;
use crate::controller::eligible_element;
use crate::host::{Host, Subscription};
use crate::input::{InputEvent, Key, KeyEvent};
use resize_core::{Direction, ElementId, NodeRef, Range};

/// The key-down capability.
#[derive(Debug, Default)]
pub struct Keyboard;

impl Keyboard {
    pub fn new() -> Self {
        Self
    }

    fn keydown(&self, event: &KeyEvent, cx: &mut Context<'_>) -> EventOutcome {
        if event.default_prevented || event.modifiers.reserved() || event.synthetic {
            return EventOutcome::Ignored;
        }
        let node = cx.target.node.clone();
        let Some(index) = cx.host.node_offset(node.id) else {
            return EventOutcome::Ignored;
        };

        match &event.key {
            key if key.is_delete() => {
                log::debug!("delete {}", node.id);
                cx.host.delete_node(node.id);
                cx.request_deactivate();
            }
            Key::Left => {
                let neighbor = index.checked_sub(1).and_then(|i| cx.host.leaf_at(i));
                move_or_activate(cx, neighbor, index);
            }
            Key::Right => {
                let after = index + cx.host.node_length(node.id).max(1);
                let neighbor = cx.host.leaf_at(after);
                move_or_activate(cx, neighbor, after);
            }
            Key::Up | Key::Down => {
                let direction = if event.key == Key::Up {
                    Direction::Previous
                } else {
                    Direction::Next
                };
                match other_line_index(&*cx.host, index, direction) {
                    Some(target) => {
                        let neighbor = cx.host.leaf_at(target);
                        move_or_activate(cx, neighbor, target);
                    }
                    None => {
                        // No line that way: put the caret on the node and let
                        // the host handle the key itself.
                        cx.host.set_selection(Some(Range::caret(index)));
                        cx.request_deactivate();
                        let mut redispatch = event.clone();
                        redispatch.synthetic = true;
                        cx.host.dispatch_key(redispatch);
                    }
                }
            }
            _ => return EventOutcome::Ignored,
        }
        EventOutcome::Handled
    }
}

/// Activate `neighbor` if eligible, else place the caret at `index` and
/// deactivate.
fn move_or_activate(cx: &mut Context<'_>, neighbor: Option<NodeRef>, index: usize) {
    if let Some(node) = neighbor
        && node.id != cx.target.node.id
        && let Some(element) = cx.eligible(&node)
    {
        cx.request_activate(node, element);
        return;
    }
    cx.host.set_selection(Some(Range::caret(index)));
    cx.request_deactivate();
}

/// Index on the previous/next line just after the column of `index`,
/// clamped to that line's text. An embed line yields its own offset.
/// `None` when there is no such line.
pub fn other_line_index(host: &dyn Host, index: usize, direction: Direction) -> Option<usize> {
    let line = host.line_at(index)?;
    let other = host.adjacent_line(line.node.id, direction)?;
    let column = index.saturating_sub(line.offset) + 1;
    let text_len = if other.is_text_block {
        other.length.saturating_sub(1)
    } else {
        0
    };
    Some(other.offset + column.min(text_len))
}

impl Capability for Keyboard {
    fn name(&self) -> &str {
        "Keyboard"
    }

    fn mount(&mut self, cx: &mut Context<'_>) {
        cx.host.subscribe(Subscription::DocumentKeys);
    }

    fn unmount(&mut self, cx: &mut Context<'_>) {
        cx.host.unsubscribe(Subscription::DocumentKeys);
    }

    fn handle(&mut self, event: &InputEvent, cx: &mut Context<'_>) -> EventOutcome {
        match event {
            InputEvent::Key(key) => self.keydown(key, cx),
            _ => EventOutcome::Ignored,
        }
    }
}

// ─── Arrow interceptor ───────────────────────────────────────────────────

/// The node a Left/Right caret move from `range` should activate instead
/// of moving, or `None` to let the host move the caret as usual.
pub fn navigation_target(
    host: &dyn Host,
    config: &ResizeConfig,
    key: &Key,
    range: Range,
) -> Option<(NodeRef, ElementId)> {
    let eligible = |node: NodeRef| {
        let element = host.element_of(node.id)?;
        eligible_element(host, config, &node, element).map(|el| (node, el))
    };

    match key {
        Key::Left => {
            let before = range.index.checked_sub(1)?;
            let line = host.line_at(before)?;
            if let Some(hit) = eligible(line.node.clone()) {
                return Some(hit);
            }
            // At the start of a line the caret wraps; leave that to the host.
            if host.line_at(range.index).is_some_and(|l| l.offset == range.index) {
                return None;
            }
            eligible(host.leaf_at(before)?)
        }
        Key::Right => {
            let index = range.index + range.length;
            let line = host.line_at(index)?;
            if let Some(hit) = eligible(line.node.clone()) {
                return Some(hit);
            }
            if index + 1 == line.offset + line.length {
                return None;
            }
            eligible(host.leaf_at(index)?)
        }
        _ => None,
    }
}

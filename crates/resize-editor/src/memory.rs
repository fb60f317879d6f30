//! In-memory host: a flat document of lines and leaves with fixed geometry.
//!
//! Used for headless embedding and tests. Writes are recorded as pending
//! change notifications that the embedder drains with
//! [`MemoryHost::take_changes`] and feeds back to the controller, the same
//! way a real editor delivers them after the handler returns.

use crate::host::{ChangeSource, CursorScope, Host, Subscription};
use crate::input::KeyEvent;
use crate::overlay::OverlayState;
use resize_core::{
    CssSize, Direction, ElementId, LineInfo, NodeId, NodeRef, NodeScope, Range, Rect,
    ScrollOffset, Size,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A leaf to place on a text line.
#[derive(Debug, Clone)]
pub struct Leaf {
    pub kind: String,
    pub length: usize,
    /// Rendered element tag and box, for embeds.
    pub element: Option<(String, Rect)>,
}

impl Leaf {
    pub fn text(length: usize) -> Self {
        Self {
            kind: "text".to_string(),
            length,
            element: None,
        }
    }

    pub fn embed(kind: &str, tag: &str, rect: Rect) -> Self {
        Self {
            kind: kind.to_string(),
            length: 1,
            element: Some((tag.to_string(), rect)),
        }
    }
}

#[derive(Debug, Clone)]
struct MemNode {
    kind: String,
    scope: NodeScope,
    length: usize,
    element: Option<ElementId>,
    attrs: BTreeMap<String, String>,
    formats: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
enum MemLine {
    /// A text block: leaves followed by a newline.
    Text { id: NodeId, leaves: Vec<NodeId> },
    /// A block embed occupying the whole line.
    Embed { id: NodeId },
}

impl MemLine {
    fn id(&self) -> NodeId {
        match self {
            Self::Text { id, .. } | Self::Embed { id } => *id,
        }
    }
}

#[derive(Debug, Clone)]
struct MemElement {
    tag: String,
    rect: Rect,
    intrinsic: Option<Size>,
    classes: BTreeSet<String>,
    inline: Option<CssSize>,
}

/// In-memory [`Host`].
#[derive(Debug, Clone)]
pub struct MemoryHost {
    lines: Vec<MemLine>,
    nodes: HashMap<NodeId, MemNode>,
    /// Insertion order doubles as paint order for hit testing.
    elements: Vec<ElementId>,
    element_data: HashMap<ElementId, MemElement>,
    element_nodes: HashMap<ElementId, NodeId>,
    root: ElementId,
    container: Rect,
    scroll: ScrollOffset,
    selection: Option<Range>,
    focused: bool,
    click_through: bool,
    click_through_tags: Vec<String>,
    user_select: bool,
    native_resize: bool,
    cursors: HashMap<CursorScope, String>,
    overlay: Option<OverlayState>,
    overlay_renders: usize,
    subscriptions: HashMap<Subscription, i32>,
    dispatched: Vec<KeyEvent>,
    changes: Vec<ChangeSource>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            nodes: HashMap::new(),
            elements: Vec::new(),
            element_data: HashMap::new(),
            element_nodes: HashMap::new(),
            root: ElementId::with_prefix("root"),
            container: Rect::default(),
            scroll: ScrollOffset::default(),
            selection: None,
            focused: false,
            click_through: false,
            click_through_tags: vec!["VIDEO".to_string(), "IFRAME".to_string()],
            user_select: true,
            native_resize: true,
            cursors: HashMap::new(),
            overlay: None,
            overlay_renders: 0,
            subscriptions: HashMap::new(),
            dispatched: Vec::new(),
            changes: Vec::new(),
        }
    }

    // ─── Building ────────────────────────────────────────────────────────

    fn add_node(&mut self, kind: &str, scope: NodeScope, length: usize) -> NodeId {
        let id = NodeId::with_prefix(kind);
        self.nodes.insert(
            id,
            MemNode {
                kind: kind.to_string(),
                scope,
                length,
                element: None,
                attrs: BTreeMap::new(),
                formats: BTreeMap::new(),
            },
        );
        id
    }

    fn add_element(&mut self, node: NodeId, tag: &str, rect: Rect) -> ElementId {
        let element = ElementId::with_prefix(&tag.to_ascii_lowercase());
        self.elements.push(element);
        self.element_data.insert(
            element,
            MemElement {
                tag: tag.to_string(),
                rect,
                intrinsic: None,
                classes: BTreeSet::new(),
                inline: None,
            },
        );
        self.element_nodes.insert(element, node);
        if let Some(n) = self.nodes.get_mut(&node) {
            n.element = Some(element);
        }
        element
    }

    fn push_text(&mut self, leaves: Vec<Leaf>) -> (NodeId, Vec<(NodeId, Option<ElementId>)>) {
        let line = self.add_node("block", NodeScope::Block, 0);
        let mut out = Vec::with_capacity(leaves.len());
        for leaf in leaves {
            let id = self.add_node(&leaf.kind, NodeScope::Inline, leaf.length);
            let element = leaf
                .element
                .map(|(tag, rect)| self.add_element(id, &tag, rect));
            out.push((id, element));
        }
        self.lines.push(MemLine::Text {
            id: line,
            leaves: out.iter().map(|(id, _)| *id).collect(),
        });
        (line, out)
    }

    /// Append a text line. Returns each leaf with its element, if any.
    pub fn push_line(&mut self, leaves: Vec<Leaf>) -> Vec<(NodeId, Option<ElementId>)> {
        self.push_text(leaves).1
    }

    /// Append a line holding `length` characters of plain text.
    pub fn push_text_line(&mut self, length: usize) -> NodeId {
        let leaves = if length == 0 {
            Vec::new()
        } else {
            vec![Leaf::text(length)]
        };
        self.push_text(leaves).0
    }

    /// Append an embed. Block embeds take a line of their own; inline ones
    /// get a text line containing only them.
    pub fn push_embed_line(
        &mut self,
        kind: &str,
        scope: NodeScope,
        tag: &str,
        rect: Rect,
    ) -> (NodeId, ElementId) {
        match scope {
            NodeScope::Block => {
                let id = self.add_node(kind, NodeScope::Block, 1);
                let element = self.add_element(id, tag, rect);
                self.lines.push(MemLine::Embed { id });
                (id, element)
            }
            NodeScope::Inline => {
                let line = self.add_node("block", NodeScope::Block, 0);
                let id = self.add_node(kind, NodeScope::Inline, 1);
                let element = self.add_element(id, tag, rect);
                self.lines.push(MemLine::Text {
                    id: line,
                    leaves: vec![id],
                });
                (id, element)
            }
        }
    }

    // ─── Test knobs ──────────────────────────────────────────────────────

    pub fn set_rect(&mut self, element: ElementId, rect: Rect) {
        if let Some(data) = self.element_data.get_mut(&element) {
            data.rect = rect;
        }
    }

    pub fn set_intrinsic_size(&mut self, element: ElementId, size: Size) {
        if let Some(data) = self.element_data.get_mut(&element) {
            data.intrinsic = Some(size);
        }
    }

    pub fn set_container(&mut self, rect: Rect) {
        self.container = rect;
    }

    pub fn set_scroll(&mut self, scroll: ScrollOffset) {
        self.scroll = scroll;
    }

    /// Re-render `node` under a new element, as an editor does when it
    /// rebuilds a node's DOM.
    pub fn rerender(&mut self, node: NodeId, tag: &str, rect: Rect) -> Option<ElementId> {
        let old = self.nodes.get(&node)?.element?;
        self.drop_element(old);
        let element = self.add_element(node, tag, rect);
        self.changes.push(ChangeSource::User);
        Some(element)
    }

    /// Insert plain text at the start of `line`, as typing would.
    pub fn type_text(&mut self, line: NodeId, length: usize) {
        let id = self.add_node("text", NodeScope::Inline, length);
        let Some(MemLine::Text { leaves, .. }) = self.lines.iter_mut().find(|l| l.id() == line)
        else {
            self.nodes.remove(&id);
            return;
        };
        leaves.insert(0, id);
        self.changes.push(ChangeSource::User);
    }

    // ─── Inspection ──────────────────────────────────────────────────────

    /// Drain pending change notifications.
    pub fn take_changes(&mut self) -> Vec<ChangeSource> {
        std::mem::take(&mut self.changes)
    }

    pub fn classes(&self, element: ElementId) -> Vec<String> {
        self.element_data
            .get(&element)
            .map(|d| d.classes.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.element_data
            .get(&element)
            .is_some_and(|d| d.classes.contains(class))
    }

    pub fn cursor(&self, scope: CursorScope) -> Option<&str> {
        self.cursors.get(&scope).map(String::as_str)
    }

    pub fn inline_size(&self, element: ElementId) -> Option<&CssSize> {
        self.element_data.get(&element)?.inline.as_ref()
    }

    pub fn rendered_overlay(&self) -> Option<&OverlayState> {
        self.overlay.as_ref()
    }

    pub fn overlay_renders(&self) -> usize {
        self.overlay_renders
    }

    /// Net subscribe count for `subscription`.
    pub fn subscription_count(&self, subscription: Subscription) -> i32 {
        self.subscriptions.get(&subscription).copied().unwrap_or(0)
    }

    /// Subscriptions with a non-zero net count.
    pub fn live_subscriptions(&self) -> Vec<Subscription> {
        let mut live: Vec<_> = self
            .subscriptions
            .iter()
            .filter(|(_, n)| **n != 0)
            .map(|(s, _)| *s)
            .collect();
        live.sort_by_key(|s| format!("{s:?}"));
        live
    }

    pub fn dispatched_keys(&self) -> &[KeyEvent] {
        &self.dispatched
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn click_through(&self) -> bool {
        self.click_through
    }

    pub fn user_select(&self) -> bool {
        self.user_select
    }

    pub fn native_resize(&self) -> bool {
        self.native_resize
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.node_offset(node).is_some()
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn node_ref(&self, id: NodeId) -> Option<NodeRef> {
        let node = self.nodes.get(&id)?;
        Some(NodeRef::new(id, node.kind.clone(), node.scope))
    }

    fn leaf_len(&self, id: NodeId) -> usize {
        self.nodes.get(&id).map(|n| n.length).unwrap_or(0)
    }

    fn line_len(&self, line: &MemLine) -> usize {
        match line {
            MemLine::Text { leaves, .. } => {
                leaves.iter().map(|id| self.leaf_len(*id)).sum::<usize>() + 1
            }
            MemLine::Embed { id } => self.leaf_len(*id),
        }
    }

    /// Lines with their document offsets.
    fn lines_with_offsets(&self) -> Vec<(usize, &MemLine)> {
        let mut offset = 0;
        self.lines
            .iter()
            .map(|line| {
                let start = offset;
                offset += self.line_len(line);
                (start, line)
            })
            .collect()
    }

    /// Every leaf with its document offset.
    fn leaves_with_offsets(&self) -> Vec<(usize, NodeId)> {
        let mut out = Vec::new();
        for (offset, line) in self.lines_with_offsets() {
            match line {
                MemLine::Text { leaves, .. } => {
                    let mut at = offset;
                    for id in leaves {
                        out.push((at, *id));
                        at += self.leaf_len(*id);
                    }
                }
                MemLine::Embed { id } => out.push((offset, *id)),
            }
        }
        out
    }

    fn line_info(&self, offset: usize, line: &MemLine) -> Option<LineInfo> {
        Some(LineInfo {
            node: self.node_ref(line.id())?,
            offset,
            length: self.line_len(line),
            is_text_block: matches!(line, MemLine::Text { .. }),
        })
    }

    fn drop_element(&mut self, element: ElementId) {
        self.elements.retain(|e| *e != element);
        self.element_data.remove(&element);
        self.element_nodes.remove(&element);
    }

    /// Rendered box, with any inline size override applied.
    fn effective_rect(&self, data: &MemElement) -> Rect {
        let mut rect = data.rect;
        if let Some(css) = &data.inline {
            if let Some(w) = css.width.as_deref().and_then(parse_px) {
                rect.width = w;
            }
            if let Some(h) = css.height.as_deref().and_then(parse_px) {
                rect.height = h;
            }
        }
        rect
    }
}

fn parse_px(value: &str) -> Option<f32> {
    value.trim_end_matches("px").parse().ok()
}

impl Host for MemoryHost {
    fn find_node(&self, element: ElementId) -> Option<NodeRef> {
        self.node_ref(*self.element_nodes.get(&element)?)
    }

    fn element_of(&self, node: NodeId) -> Option<ElementId> {
        self.nodes.get(&node)?.element
    }

    fn node_offset(&self, node: NodeId) -> Option<usize> {
        if let Some((offset, _)) = self
            .lines_with_offsets()
            .into_iter()
            .find(|(_, line)| line.id() == node)
        {
            return Some(offset);
        }
        self.leaves_with_offsets()
            .into_iter()
            .find(|(_, id)| *id == node)
            .map(|(offset, _)| offset)
    }

    fn node_length(&self, node: NodeId) -> usize {
        match self.lines.iter().find(|l| l.id() == node) {
            Some(line) => self.line_len(line),
            None => self.leaf_len(node),
        }
    }

    fn line_at(&self, index: usize) -> Option<LineInfo> {
        self.lines_with_offsets()
            .into_iter()
            .find(|(offset, line)| index < offset + self.line_len(line))
            .and_then(|(offset, line)| self.line_info(offset, line))
    }

    fn adjacent_line(&self, line: NodeId, direction: Direction) -> Option<LineInfo> {
        let lines = self.lines_with_offsets();
        let at = lines.iter().position(|(_, l)| l.id() == line)?;
        let other = match direction {
            Direction::Previous => at.checked_sub(1)?,
            Direction::Next => at + 1,
        };
        let (offset, line) = lines.get(other)?;
        self.line_info(*offset, line)
    }

    fn leaf_at(&self, index: usize) -> Option<NodeRef> {
        self.leaves_with_offsets()
            .into_iter()
            .find(|(offset, id)| *offset <= index && index < offset + self.leaf_len(*id))
            .and_then(|(_, id)| self.node_ref(id))
    }

    fn leaves_in(&self, range: Range) -> Vec<NodeRef> {
        let end = range.index + range.length;
        self.leaves_with_offsets()
            .into_iter()
            .filter(|(offset, id)| *offset < end && range.index < offset + self.leaf_len(*id))
            .filter_map(|(_, id)| self.node_ref(id))
            .collect()
    }

    fn delete_node(&mut self, node: NodeId) {
        self.lines.retain(|l| !matches!(l, MemLine::Embed { id } if *id == node));
        for line in self.lines.iter_mut() {
            if let MemLine::Text { leaves, .. } = line {
                leaves.retain(|id| *id != node);
            }
        }
        if let Some(element) = self.nodes.remove(&node).and_then(|n| n.element) {
            self.drop_element(element);
        }
        self.changes.push(ChangeSource::Api);
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes.get(&node)?.attrs.get(name).cloned()
    }

    fn set_attributes(&mut self, node: NodeId, attrs: &[(&str, Option<String>)]) {
        let Some(n) = self.nodes.get_mut(&node) else {
            return;
        };
        for (name, value) in attrs {
            match value {
                Some(value) => n.attrs.insert(name.to_string(), value.clone()),
                None => n.attrs.remove(*name),
            };
        }
        // Width/height attributes drive the rendered box.
        let width = n.attrs.get("width").and_then(|v| parse_px(v));
        let height = n.attrs.get("height").and_then(|v| parse_px(v));
        if let Some(data) = n.element.and_then(|el| self.element_data.get_mut(&el)) {
            if let Some(w) = width {
                data.rect.width = w;
            }
            if let Some(h) = height {
                data.rect.height = h;
            }
        }
        self.changes.push(ChangeSource::Api);
    }

    fn format_value(&self, index: usize, name: &str) -> Option<String> {
        let leaf = self.leaf_at(index)?;
        if let Some(value) = self.nodes.get(&leaf.id)?.formats.get(name) {
            return Some(value.clone());
        }
        let line = self.line_at(index)?;
        self.nodes.get(&line.node.id)?.formats.get(name).cloned()
    }

    fn format_text(&mut self, index: usize, length: usize, name: &str, value: Option<&str>) {
        for leaf in self.leaves_in(Range::new(index, length)) {
            if let Some(node) = self.nodes.get_mut(&leaf.id) {
                match value {
                    Some(v) => node.formats.insert(name.to_string(), v.to_string()),
                    None => node.formats.remove(name),
                };
            }
        }
        self.changes.push(ChangeSource::Api);
    }

    fn format_line(&mut self, index: usize, length: usize, name: &str, value: Option<&str>) {
        let end = index + length.max(1);
        let lines: Vec<NodeId> = self
            .lines_with_offsets()
            .into_iter()
            .filter(|(offset, line)| *offset < end && index < offset + self.line_len(line))
            .map(|(_, line)| line.id())
            .collect();
        for id in lines {
            if let Some(node) = self.nodes.get_mut(&id) {
                match value {
                    Some(v) => node.formats.insert(name.to_string(), v.to_string()),
                    None => node.formats.remove(name),
                };
            }
        }
        self.changes.push(ChangeSource::Api);
    }

    fn selection(&self) -> Option<Range> {
        self.selection
    }

    fn set_selection(&mut self, range: Option<Range>) {
        self.selection = range;
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn root(&self) -> ElementId {
        self.root
    }

    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        self.element_data
            .get(&element)
            .map(|d| self.effective_rect(d))
    }

    fn container_rect(&self) -> Rect {
        self.container
    }

    fn scroll_offset(&self) -> ScrollOffset {
        self.scroll
    }

    fn intrinsic_size(&self, element: ElementId) -> Option<Size> {
        self.element_data.get(&element)?.intrinsic
    }

    fn element_from_point(&self, x: f32, y: f32) -> Option<ElementId> {
        let hit = self.elements.iter().rev().find(|el| {
            let Some(data) = self.element_data.get(el) else {
                return false;
            };
            let blocked = self.click_through && self.click_through_tags.contains(&data.tag);
            !blocked && self.effective_rect(data).contains(x, y)
        });
        Some(hit.copied().unwrap_or(self.root))
    }

    fn set_click_through(&mut self, enabled: bool) {
        self.click_through = enabled;
    }

    fn set_inline_size(&mut self, element: ElementId, size: Option<&CssSize>) {
        if let Some(data) = self.element_data.get_mut(&element) {
            data.inline = size.cloned();
        }
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        if let Some(data) = self.element_data.get_mut(&element) {
            data.classes.insert(class.to_string());
        }
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        if let Some(data) = self.element_data.get_mut(&element) {
            data.classes.remove(class);
        }
    }

    fn set_cursor(&mut self, scope: CursorScope, cursor: Option<&str>) {
        match cursor {
            Some(cursor) => self.cursors.insert(scope, cursor.to_string()),
            None => self.cursors.remove(&scope),
        };
    }

    fn set_user_select(&mut self, enabled: bool) {
        self.user_select = enabled;
    }

    fn render_overlay(&mut self, overlay: Option<&OverlayState>) {
        self.overlay = overlay.cloned();
        self.overlay_renders += 1;
    }

    fn subscribe(&mut self, subscription: Subscription) {
        *self.subscriptions.entry(subscription).or_insert(0) += 1;
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        *self.subscriptions.entry(subscription).or_insert(0) -= 1;
    }

    fn dispatch_key(&mut self, event: KeyEvent) {
        self.dispatched.push(event);
    }

    fn disable_native_resize(&mut self) {
        self.native_resize = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn offsets_count_newlines_and_embeds() {
        let mut host = MemoryHost::new();
        let first = host.push_line(vec![
            Leaf::text(4),
            Leaf::embed("image", "IMG", Rect::new(0.0, 0.0, 200.0, 100.0)),
            Leaf::text(2),
        ]);
        let (video, _) = host.push_embed_line(
            "video",
            NodeScope::Block,
            "IFRAME",
            Rect::new(0.0, 120.0, 400.0, 225.0),
        );

        assert_eq!(host.node_offset(first[1].0), Some(4));
        assert_eq!(host.node_offset(video), Some(8));
        assert_eq!(host.leaf_at(4).map(|n| n.kind), Some("image".to_string()));
        // The newline at 7 belongs to no leaf.
        assert_eq!(host.leaf_at(7), None);
        assert_eq!(host.line_at(7).map(|l| l.length), Some(8));
        assert_eq!(host.line_at(8).map(|l| l.is_text_block), Some(false));
    }

    #[test]
    fn click_through_hides_embed_tags_from_hit_tests() {
        let mut host = MemoryHost::new();
        let (_, frame) = host.push_embed_line(
            "video",
            NodeScope::Block,
            "IFRAME",
            Rect::new(0.0, 0.0, 400.0, 225.0),
        );
        host.set_click_through(true);
        assert_eq!(host.element_from_point(10.0, 10.0), Some(host.root()));
        host.set_click_through(false);
        assert_eq!(host.element_from_point(10.0, 10.0), Some(frame));
    }

    #[test]
    fn inline_size_overrides_rendered_box() {
        let mut host = MemoryHost::new();
        let (_, img) = host.push_embed_line(
            "image",
            NodeScope::Inline,
            "IMG",
            Rect::new(0.0, 0.0, 200.0, 150.0),
        );
        let css = CssSize {
            width: Some("260px".into()),
            height: None,
        };
        host.set_inline_size(img, Some(&css));
        assert_eq!(host.bounding_rect(img).map(|r| r.width), Some(260.0));
        host.set_inline_size(img, None);
        assert_eq!(host.bounding_rect(img).map(|r| r.width), Some(200.0));
    }
}

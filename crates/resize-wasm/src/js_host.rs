//! `Host` implemented over a JavaScript object.
//!
//! Every trait method maps to a camelCase method on the JS host object
//! (`findNode`, `boundingRect`, `renderOverlay`, ...). Structured values
//! cross the boundary as plain JS objects and are converted through JSON.
//! A missing method or a thrown exception degrades to "no answer".
//!
//! The JS side must queue change and selection notifications and deliver
//! them to `ResizeModule` after the current handler returns.

use resize_core::{
    CssSize, Direction, ElementId, LineInfo, NodeId, NodeRef, Range, Rect, ScrollOffset, Size,
};
use resize_editor::{CursorScope, Host, KeyEvent, OverlayState, Subscription};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineWire {
    node: NodeRef,
    offset: usize,
    length: usize,
    #[serde(default)]
    is_text_block: bool,
}

impl From<LineWire> for LineInfo {
    fn from(w: LineWire) -> Self {
        LineInfo {
            node: w.node,
            offset: w.offset,
            length: w.length,
            is_text_block: w.is_text_block,
        }
    }
}

#[derive(Deserialize, Default)]
struct ScrollWire {
    #[serde(default)]
    left: f32,
    #[serde(default)]
    top: f32,
}

pub struct JsHost {
    target: JsValue,
    root: ElementId,
}

impl JsHost {
    pub fn new(target: JsValue) -> Self {
        let mut host = Self {
            target,
            root: ElementId::intern("root"),
        };
        if let Some(root) = host.call("root", &[]).and_then(|v| v.as_string()) {
            host.root = ElementId::intern(&root);
        }
        host
    }

    /// Invoke `method` on the host object. `None` when the method is
    /// missing, throws, or returns `null`/`undefined`.
    fn call(&self, method: &str, args: &[JsValue]) -> Option<JsValue> {
        let func = js_sys::Reflect::get(&self.target, &JsValue::from_str(method))
            .ok()?
            .dyn_into::<js_sys::Function>()
            .ok()?;
        let args: js_sys::Array = args.iter().collect();
        match func.apply(&self.target, &args) {
            Ok(value) if value.is_null() || value.is_undefined() => None,
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("host.{method} threw: {err:?}");
                None
            }
        }
    }

    fn call_json<T: DeserializeOwned>(&self, method: &str, args: &[JsValue]) -> Option<T> {
        let value = self.call(method, args)?;
        let text = String::from(js_sys::JSON::stringify(&value).ok()?);
        match serde_json::from_str(&text) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                log::warn!("host.{method} returned an unexpected shape: {e}");
                None
            }
        }
    }

    fn call_f64(&self, method: &str, args: &[JsValue]) -> Option<f64> {
        self.call(method, args)?.as_f64()
    }

    fn call_string(&self, method: &str, args: &[JsValue]) -> Option<String> {
        self.call(method, args)?.as_string()
    }
}

fn id(s: &str) -> JsValue {
    JsValue::from_str(s)
}

fn opt_str(value: Option<&str>) -> JsValue {
    value.map_or(JsValue::NULL, JsValue::from_str)
}

/// Serialize through JSON into a plain JS object.
pub(crate) fn to_js<T: serde::Serialize>(value: &T) -> JsValue {
    serde_json::to_string(value)
        .ok()
        .and_then(|json| js_sys::JSON::parse(&json).ok())
        .unwrap_or(JsValue::NULL)
}

fn subscription_name(subscription: Subscription) -> &'static str {
    match subscription {
        Subscription::DocumentPointer => "documentPointer",
        Subscription::DocumentKeys => "documentKeys",
        Subscription::RootScroll => "rootScroll",
        Subscription::RootInput => "rootInput",
    }
}

impl Host for JsHost {
    // ─── Document ────────────────────────────────────────────────────────

    fn find_node(&self, element: ElementId) -> Option<NodeRef> {
        self.call_json("findNode", &[id(element.as_str())])
    }

    fn element_of(&self, node: NodeId) -> Option<ElementId> {
        self.call_string("elementOf", &[id(node.as_str())])
            .map(|s| ElementId::intern(&s))
    }

    fn node_offset(&self, node: NodeId) -> Option<usize> {
        self.call_f64("nodeOffset", &[id(node.as_str())])
            .filter(|n| *n >= 0.0)
            .map(|n| n as usize)
    }

    fn node_length(&self, node: NodeId) -> usize {
        self.call_f64("nodeLength", &[id(node.as_str())])
            .map_or(1, |n| n.max(0.0) as usize)
    }

    fn line_at(&self, index: usize) -> Option<LineInfo> {
        self.call_json::<LineWire>("lineAt", &[JsValue::from_f64(index as f64)])
            .map(LineInfo::from)
    }

    fn adjacent_line(&self, line: NodeId, direction: Direction) -> Option<LineInfo> {
        let direction = match direction {
            Direction::Previous => "previous",
            Direction::Next => "next",
        };
        self.call_json::<LineWire>("adjacentLine", &[id(line.as_str()), id(direction)])
            .map(LineInfo::from)
    }

    fn leaf_at(&self, index: usize) -> Option<NodeRef> {
        self.call_json("leafAt", &[JsValue::from_f64(index as f64)])
    }

    fn leaves_in(&self, range: Range) -> Vec<NodeRef> {
        self.call_json("leavesIn", &[to_js(&range)])
            .unwrap_or_default()
    }

    fn delete_node(&mut self, node: NodeId) {
        self.call("deleteNode", &[id(node.as_str())]);
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.call_string("attribute", &[id(node.as_str()), id(name)])
    }

    fn set_attributes(&mut self, node: NodeId, attrs: &[(&str, Option<String>)]) {
        let map: serde_json::Map<String, serde_json::Value> = attrs
            .iter()
            .map(|(name, value)| {
                let value = value
                    .clone()
                    .map_or(serde_json::Value::Null, serde_json::Value::String);
                (name.to_string(), value)
            })
            .collect();
        self.call("setAttributes", &[id(node.as_str()), to_js(&map)]);
    }

    fn format_value(&self, index: usize, name: &str) -> Option<String> {
        self.call_string("formatValue", &[JsValue::from_f64(index as f64), id(name)])
    }

    fn format_text(&mut self, index: usize, length: usize, name: &str, value: Option<&str>) {
        self.call(
            "formatText",
            &[
                JsValue::from_f64(index as f64),
                JsValue::from_f64(length as f64),
                id(name),
                opt_str(value),
            ],
        );
    }

    fn format_line(&mut self, index: usize, length: usize, name: &str, value: Option<&str>) {
        self.call(
            "formatLine",
            &[
                JsValue::from_f64(index as f64),
                JsValue::from_f64(length as f64),
                id(name),
                opt_str(value),
            ],
        );
    }

    // ─── Selection ───────────────────────────────────────────────────────

    fn selection(&self) -> Option<Range> {
        self.call_json("selection", &[])
    }

    fn set_selection(&mut self, range: Option<Range>) {
        let arg = range.as_ref().map_or(JsValue::NULL, to_js);
        self.call("setSelection", &[arg]);
    }

    fn focus(&mut self) {
        self.call("focus", &[]);
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    fn root(&self) -> ElementId {
        self.root
    }

    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        self.call_json("boundingRect", &[id(element.as_str())])
    }

    fn container_rect(&self) -> Rect {
        self.call_json("containerRect", &[]).unwrap_or_default()
    }

    fn scroll_offset(&self) -> ScrollOffset {
        let wire: ScrollWire = self.call_json("scrollOffset", &[]).unwrap_or_default();
        ScrollOffset {
            left: wire.left,
            top: wire.top,
        }
    }

    fn intrinsic_size(&self, element: ElementId) -> Option<Size> {
        self.call_json("intrinsicSize", &[id(element.as_str())])
    }

    fn element_from_point(&self, x: f32, y: f32) -> Option<ElementId> {
        self.call_string(
            "elementFromPoint",
            &[JsValue::from_f64(x as f64), JsValue::from_f64(y as f64)],
        )
        .map(|s| ElementId::intern(&s))
    }

    fn set_click_through(&mut self, enabled: bool) {
        self.call("setClickThrough", &[JsValue::from_bool(enabled)]);
    }

    fn set_inline_size(&mut self, element: ElementId, size: Option<&CssSize>) {
        let arg = size.map_or(JsValue::NULL, to_js);
        self.call("setInlineSize", &[id(element.as_str()), arg]);
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        self.call("addClass", &[id(element.as_str()), id(class)]);
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        self.call("removeClass", &[id(element.as_str()), id(class)]);
    }

    fn set_cursor(&mut self, scope: CursorScope, cursor: Option<&str>) {
        let scope = match scope {
            CursorScope::Body => JsValue::NULL,
            CursorScope::Element(element) => id(element.as_str()),
        };
        self.call("setCursor", &[scope, opt_str(cursor)]);
    }

    fn set_user_select(&mut self, enabled: bool) {
        self.call("setUserSelect", &[JsValue::from_bool(enabled)]);
    }

    fn render_overlay(&mut self, overlay: Option<&OverlayState>) {
        let arg = overlay.map_or(JsValue::NULL, to_js);
        self.call("renderOverlay", &[arg]);
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    fn subscribe(&mut self, subscription: Subscription) {
        self.call("subscribe", &[id(subscription_name(subscription))]);
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        self.call("unsubscribe", &[id(subscription_name(subscription))]);
    }

    fn dispatch_key(&mut self, event: KeyEvent) {
        let m = event.modifiers;
        let init = serde_json::json!({
            "key": event.key.name(),
            "shiftKey": m.shift,
            "ctrlKey": m.ctrl,
            "altKey": m.alt,
            "metaKey": m.meta,
            "synthetic": event.synthetic,
        });
        self.call("dispatchKey", &[to_js(&init)]);
    }

    fn disable_native_resize(&mut self) {
        self.call("disableNativeResize", &[]);
    }
}

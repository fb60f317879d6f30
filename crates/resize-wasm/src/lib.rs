//! WASM bridge for embed resizing: exposes the resize controller to
//! JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The editor integration
//! passes a host object (see [`js_host`]) plus the user options as JSON,
//! then forwards DOM events to the `ResizeModule` methods. Every event
//! method returns `true` when the caller should `preventDefault()`.

mod js_host;

use js_host::{JsHost, to_js};
use resize_core::{ElementId, HandlePosition, NodeRef, Range, ResolvedSize};
use resize_editor::{
    ChangeSource, EventTarget, Hooks, Host, InputEvent, Key, KeyEvent, Modifiers, PointerKind,
    ResizeConfig, ResizeController,
};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// The WASM-facing resize module, one per editor instance.
#[wasm_bindgen]
pub struct ResizeModule {
    controller: ResizeController<JsHost>,
}

#[wasm_bindgen]
impl ResizeModule {
    /// Attach to an editor. `options` is the user configuration as JSON
    /// (`""` for defaults); `callbacks` may carry `onActive`, `onInactive`
    /// and `onChangeSize` functions.
    #[wasm_bindgen(constructor)]
    pub fn new(host: JsValue, options: &str, callbacks: JsValue) -> Result<ResizeModule, JsValue> {
        // Set up panic hook for better error messages in console
        console_error_panic_hook_setup();

        let config = if options.trim().is_empty() {
            ResizeConfig::default()
        } else {
            ResizeConfig::from_json(options).map_err(|e| JsValue::from_str(&e))?
        };
        let config = config.with_hooks(js_hooks(&callbacks));
        log::debug!("resize module attached with {:?}", config.capabilities);

        Ok(Self {
            controller: ResizeController::new(JsHost::new(host), config),
        })
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Pointer pressed. `target` is one of `root`, `element`, `overlay`,
    /// `handle`, `tool` or `outside`; `id` names the element, handle
    /// (`tl`/`tr`/`br`/`bl`) or tool.
    #[allow(clippy::too_many_arguments)]
    pub fn pointer_down(
        &mut self,
        x: f32,
        y: f32,
        target: &str,
        id: &str,
        touch: bool,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let event = InputEvent::PointerDown {
            x,
            y,
            target: parse_target(target, id),
            pointer: pointer_kind(touch),
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        };
        self.forward(&event)
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, touch: bool) -> bool {
        self.forward(&InputEvent::PointerMove {
            x,
            y,
            pointer: pointer_kind(touch),
        })
    }

    pub fn pointer_up(&mut self, x: f32, y: f32, target: &str, id: &str) -> bool {
        self.forward(&InputEvent::pointer_up(x, y, parse_target(target, id)))
    }

    pub fn pointer_cancel(&mut self) -> bool {
        self.forward(&InputEvent::PointerCancel)
    }

    pub fn double_click(&mut self, target: &str, id: &str) -> bool {
        self.forward(&InputEvent::DoubleClick {
            target: parse_target(target, id),
        })
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Document-level key-down (capture phase).
    #[allow(clippy::too_many_arguments)]
    pub fn key_down(
        &mut self,
        key: &str,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
        default_prevented: bool,
        synthetic: bool,
    ) -> bool {
        let mut event = KeyEvent::new(Key::from_name(key)).with_modifiers(Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        });
        event.default_prevented = default_prevented;
        event.synthetic = synthetic;
        self.forward(&InputEvent::Key(event))
    }

    /// Arrow-key binding registered with the editor's keyboard module.
    /// `true` means a node was activated and the caret must not move.
    pub fn intercept_arrow(&mut self, key: &str, index: u32, length: u32) -> bool {
        let range = Range::new(index as usize, length as usize);
        self.controller
            .intercept_navigation(&Key::from_name(key), range)
            .is_handled()
    }

    // ─── Surface notifications ───────────────────────────────────────────

    pub fn scroll(&mut self) {
        self.forward(&InputEvent::Scroll);
    }

    pub fn root_input(&mut self) {
        self.forward(&InputEvent::RootInput);
    }

    /// Editor content changed. `source` is `user`, `api` or `silent`.
    pub fn content_changed(&mut self, source: &str) {
        let source = match source {
            "api" => ChangeSource::Api,
            "silent" => ChangeSource::Silent,
            _ => ChangeSource::User,
        };
        self.controller.handle_content_change(source);
    }

    /// Editor selection changed; `index` is absent when the editor lost it.
    pub fn selection_changed(&mut self, index: Option<u32>, length: u32) {
        let range = index.map(|i| Range::new(i as usize, length as usize));
        self.controller.handle_selection_change(range);
    }

    // ─── State ───────────────────────────────────────────────────────────

    pub fn is_active(&self) -> bool {
        self.controller.is_active()
    }

    /// Document id of the active node, if any.
    pub fn active_node(&self) -> Option<String> {
        self.controller
            .target()
            .map(|t| t.node.id.as_str().to_string())
    }

    /// Current overlay as JSON, or `null` when hidden.
    pub fn overlay_json(&self) -> String {
        match self.controller.overlay().state() {
            Some(state) => serde_json::to_string(state).unwrap_or_else(|_| "null".to_string()),
            None => "null".to_string(),
        }
    }

    /// Activate the node rendered as `element`, if it is eligible.
    pub fn activate_element(&mut self, element: &str) -> bool {
        let element = ElementId::intern(element);
        let Some(node) = self.controller.host().find_node(element) else {
            return false;
        };
        self.controller.try_activate(node, element)
    }

    pub fn deactivate(&mut self) {
        self.controller.deactivate();
    }
}

impl ResizeModule {
    fn forward(&mut self, event: &InputEvent) -> bool {
        self.controller.handle_event(event).is_handled()
    }
}

// ─── Event decoding ──────────────────────────────────────────────────────

fn parse_target(kind: &str, id: &str) -> EventTarget {
    match kind {
        "root" => EventTarget::Root,
        "element" => EventTarget::Element(ElementId::intern(id)),
        "overlay" => EventTarget::Overlay,
        "handle" => HandlePosition::from_name(id).map_or(EventTarget::Overlay, EventTarget::Handle),
        "tool" => EventTarget::ToolButton(id.to_string()),
        _ => EventTarget::Outside,
    }
}

fn pointer_kind(touch: bool) -> PointerKind {
    if touch {
        PointerKind::Touch
    } else {
        PointerKind::Mouse
    }
}

// ─── Collaborator hooks ──────────────────────────────────────────────────

fn callback(callbacks: &JsValue, name: &str) -> Option<js_sys::Function> {
    if callbacks.is_null() || callbacks.is_undefined() {
        return None;
    }
    js_sys::Reflect::get(callbacks, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<js_sys::Function>()
        .ok()
}

fn target_hook(func: js_sys::Function) -> Rc<dyn Fn(&NodeRef, ElementId)> {
    Rc::new(move |node: &NodeRef, element: ElementId| {
        let node_id = JsValue::from_str(node.id.as_str());
        let element_id = JsValue::from_str(element.as_str());
        if let Err(err) = func.call2(&JsValue::NULL, &node_id, &element_id) {
            log::warn!("resize hook threw: {err:?}");
        }
    })
}

/// `onChangeSize(nodeId, elementId, {width?, height?})`; unset axes are
/// left out of the size object.
fn js_hooks(callbacks: &JsValue) -> Hooks {
    let on_change_size = callback(callbacks, "onChangeSize").map(|func| {
        Rc::new(move |node: &NodeRef, element: ElementId, size: ResolvedSize| {
            let node_id = JsValue::from_str(node.id.as_str());
            let element_id = JsValue::from_str(element.as_str());
            if let Err(err) = func.call3(&JsValue::NULL, &node_id, &element_id, &to_js(&size)) {
                log::warn!("onChangeSize threw: {err:?}");
            }
        }) as Rc<dyn Fn(&NodeRef, ElementId, ResolvedSize)>
    });
    Hooks {
        on_active: callback(callbacks, "onActive").map(target_hook),
        on_inactive: callback(callbacks, "onInactive").map(target_hook),
        on_change_size,
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("resize WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone validation (no editor needed) ────────────────────────────

/// Validate user options. Returns JSON: `{"ok":true}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_options(options: &str) -> String {
    match ResizeConfig::from_json(options) {
        Ok(_) => r#"{"ok":true}"#.to_string(),
        Err(e) => serde_json::json!({ "ok": false, "error": e }).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn targets_decode() {
        assert_eq!(parse_target("root", ""), EventTarget::Root);
        assert_eq!(
            parse_target("handle", "br"),
            EventTarget::Handle(HandlePosition::BottomRight)
        );
        assert_eq!(parse_target("handle", "zz"), EventTarget::Overlay);
        assert_eq!(
            parse_target("tool", "center"),
            EventTarget::ToolButton("center".to_string())
        );
        assert_eq!(parse_target("window", ""), EventTarget::Outside);
    }

    #[test]
    fn change_size_object_omits_unset_axes() {
        let size = ResolvedSize {
            width: Some(250.0),
            height: None,
        };
        assert_eq!(
            serde_json::to_value(size).unwrap(),
            serde_json::json!({ "width": 250.0 })
        );
    }

    #[test]
    fn options_validate() {
        assert_eq!(validate_options(r#"{"keyboardSelect": false}"#), r#"{"ok":true}"#);
        assert!(validate_options(r#"{"tools": ["spin"]}"#).contains(r#""ok":false"#));
    }
}

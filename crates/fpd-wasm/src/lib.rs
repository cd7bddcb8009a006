//! WASM bridge for FPD — exposes the panel interaction engine to JavaScript.
//!
//! Compiled via `wasm-pack build --target web` and loaded by the panel
//! editor page. The host mounts the SVG itself; this crate only consumes
//! scene documents and pointer events and hands back JSON.
//!
//! Results come back two ways: every event method returns
//! `{"ok":true,"notifications":[...]}` (or `{"ok":false,"error":"..."}`),
//! and each notification is also passed to the matching registered
//! callback as a JSON string.

use fpd_core::config::EngineConfig;
use fpd_core::coords::scene_to_screen;
use fpd_core::id::ElementId;
use fpd_core::load::load_scene_json;
use fpd_core::Point;
use fpd_editor::engine::{
    DragKind, GestureError, InteractionEngine, InteractionState, Notification, ReloadMode,
};
use fpd_editor::input::{InputEvent, Modifiers, PointerButton};
use serde_json::json;
use wasm_bindgen::prelude::*;

/// The main WASM-facing panel controller.
///
/// Holds the interaction engine and the host callbacks. All interaction
/// from the page JS goes through this struct.
#[wasm_bindgen]
pub struct PanelCanvas {
    engine: InteractionEngine,
    on_selection_changed: Option<js_sys::Function>,
    on_elements_transformed: Option<js_sys::Function>,
    on_ambiguous_hit: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl PanelCanvas {
    /// Create a controller. `config_json` may be empty for the defaults,
    /// or a partial `EngineConfig` object.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<PanelCanvas, JsValue> {
        console_error_panic_hook_setup();
        let config = parse_config(config_json).map_err(|e| JsValue::from_str(&e))?;
        Ok(Self {
            engine: InteractionEngine::new(config),
            on_selection_changed: None,
            on_elements_transformed: None,
            on_ambiguous_hit: None,
        })
    }

    // ─── Callbacks ───────────────────────────────────────────────────────

    /// Called with a JSON id array whenever the selection is committed.
    pub fn on_selection_changed(&mut self, callback: js_sys::Function) {
        self.on_selection_changed = Some(callback);
    }

    /// Called with `{"updates":[...],"displacement":[dx,dy]}` after a move or resize.
    pub fn on_elements_transformed(&mut self, callback: js_sys::Function) {
        self.on_elements_transformed = Some(callback);
    }

    /// Called with `{"candidates":[...],"screenX":..,"screenY":..}` when the
    /// picker should open.
    pub fn on_ambiguous_hit(&mut self, callback: js_sys::Function) {
        self.on_ambiguous_hit = Some(callback);
    }

    // ─── Scene & gate ────────────────────────────────────────────────────

    /// Load a scene document. With `preserve_camera` the camera is kept
    /// and `selection_json` (an id array, may be empty) is restored.
    /// Returns `{"ok":true}` or `{"ok":false,"error":"..."}`.
    pub fn load_scene(&mut self, json: &str, preserve_camera: bool, selection_json: &str) -> String {
        let result = load_into(&mut self.engine, json, preserve_camera, selection_json);
        match result {
            Ok(()) => json!({ "ok": true }).to_string(),
            Err(e) => {
                log::warn!("scene load failed: {e}");
                json!({ "ok": false, "error": e }).to_string()
            }
        }
    }

    pub fn set_readiness(&mut self, scene_loaded: bool, last_mutation_applied: bool) {
        self.engine.set_readiness(scene_loaded, last_mutation_applied);
    }

    pub fn acknowledge_selection(&mut self) {
        self.engine.acknowledge_selection();
    }

    /// Abort the open gesture (e.g. on `pointercancel`).
    pub fn cancel(&mut self) -> bool {
        self.engine.cancel()
    }

    // ─── Pointer events ──────────────────────────────────────────────────

    /// Pointer pressed at container pixel `(x, y)`; `button` is the DOM
    /// `MouseEvent.button` code.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        button: i16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let event = InputEvent::PointerDown {
            x,
            y,
            button: PointerButton::from_dom(button),
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        };
        self.dispatch(&event)
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> String {
        self.dispatch(&InputEvent::pointer_move(x, y))
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> String {
        self.dispatch(&InputEvent::pointer_up(x, y))
    }

    /// DOM wheel event at `(x, y)`; zooms about the pointer.
    pub fn handle_wheel(&mut self, x: f64, y: f64, delta_y: f64, delta_mode: u32) -> String {
        self.dispatch(&InputEvent::from_wheel_delta(x, y, delta_y, delta_mode))
    }

    /// Adopt a camera computed by an external zoom behavior.
    pub fn set_zoom(&mut self, k: f64, x: f64, y: f64) -> String {
        self.dispatch(&InputEvent::Zoom { k, x, y })
    }

    // ─── Overlap picker ──────────────────────────────────────────────────

    pub fn hover_candidate(&mut self, id: f64) -> String {
        let result = self
            .engine
            .hover_candidate(js_id(id))
            .map(|()| Vec::new());
        self.report(result)
    }

    pub fn choose_candidate(&mut self, id: f64, shift: bool) -> String {
        let result = self.engine.choose_candidate(js_id(id), shift);
        self.report(result)
    }

    /// Click outside the picker: selects the highlighted candidate.
    pub fn dismiss_overlap(&mut self, shift: bool) -> String {
        let result = self.engine.dismiss_overlap(shift);
        self.report(result)
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Selected ids as a JSON array.
    pub fn get_selection_json(&self) -> String {
        serde_json::to_string(self.engine.selection()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Selection box, handles, highlights, cross marker and rubber band.
    pub fn get_decorations_json(&self) -> String {
        serde_json::to_string(&self.engine.decorations()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Camera as `{"k":..,"x":..,"y":..}`.
    pub fn get_view_json(&self) -> String {
        serde_json::to_string(&self.engine.view()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Container matrix `[a, b, c, d, e, f]` for the scene group.
    pub fn get_view_matrix(&self) -> Vec<f64> {
        let height = self.engine.scene().map_or(0.0, |s| s.height);
        self.engine.view().matrix(height).as_coeffs().to_vec()
    }

    /// Scene point → container pixels, `[x, y]`.
    pub fn scene_to_screen(&self, x: f64, y: f64) -> Vec<f64> {
        let height = self.engine.scene().map_or(0.0, |s| s.height);
        let p = scene_to_screen(Point::new(x, y), &self.engine.view(), height);
        vec![p.x, p.y]
    }

    /// `idle`, `pan`, `move`, `resize`, `rubberBand` or `resolvingOverlap`.
    pub fn get_state(&self) -> String {
        state_name(self.engine.state()).to_string()
    }
}

// ─── Internals ───────────────────────────────────────────────────────────

impl PanelCanvas {
    fn dispatch(&mut self, event: &InputEvent) -> String {
        let result = self.engine.handle(event);
        self.report(result)
    }

    /// Forward notifications to the callbacks and render the JSON reply.
    fn report(&self, result: Result<Vec<Notification>, GestureError>) -> String {
        if let Ok(notifications) = &result {
            for n in notifications {
                self.notify(n);
            }
        }
        reply_json(&result)
    }

    fn notify(&self, notification: &Notification) {
        let (callback, payload) = match notification {
            Notification::SelectionChanged(ids) => (&self.on_selection_changed, json!(ids)),
            Notification::ElementsTransformed {
                updates,
                displacement,
            } => (
                &self.on_elements_transformed,
                json!({ "updates": updates, "displacement": displacement }),
            ),
            Notification::AmbiguousHit {
                candidates,
                screen_x,
                screen_y,
            } => (
                &self.on_ambiguous_hit,
                json!({ "candidates": candidates, "screenX": screen_x, "screenY": screen_y }),
            ),
        };
        if let Some(f) = callback
            && let Err(e) = f.call1(&JsValue::NULL, &JsValue::from_str(&payload.to_string()))
        {
            log::warn!("host callback threw: {e:?}");
        }
    }
}

fn parse_config(json: &str) -> Result<EngineConfig, String> {
    if json.trim().is_empty() {
        return Ok(EngineConfig::default());
    }
    EngineConfig::from_json(json).map_err(|e| format!("invalid engine config: {e}"))
}

fn load_into(
    engine: &mut InteractionEngine,
    json: &str,
    preserve_camera: bool,
    selection_json: &str,
) -> Result<(), String> {
    let scene = load_scene_json(json).map_err(|e| e.to_string())?;
    let mode = if preserve_camera {
        let selection: Vec<ElementId> = if selection_json.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(selection_json).map_err(|e| format!("invalid selection: {e}"))?
        };
        ReloadMode::PreserveCamera { selection }
    } else {
        ReloadMode::Replace
    };
    engine.load_scene(scene, mode);
    Ok(())
}

fn reply_json(result: &Result<Vec<Notification>, GestureError>) -> String {
    match result {
        Ok(notifications) => json!({ "ok": true, "notifications": notifications }).to_string(),
        Err(e) => json!({ "ok": false, "error": e.to_string() }).to_string(),
    }
}

/// JS numbers carry element ids; they are non-negative integers.
fn js_id(id: f64) -> ElementId {
    ElementId(id.max(0.0) as u64)
}

fn state_name(state: InteractionState) -> &'static str {
    match state {
        InteractionState::Idle => "idle",
        InteractionState::Dragging(DragKind::Pan) => "pan",
        InteractionState::Dragging(DragKind::MoveSelection) => "move",
        InteractionState::Dragging(DragKind::ResizeSelection(_)) => "resize",
        InteractionState::Dragging(DragKind::RubberBand) => "rubberBand",
        InteractionState::ResolvingOverlap => "resolvingOverlap",
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
                let msg = format!("FPD WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone validation (no controller needed) ────────────────────────

/// Check a scene document. Returns `{"ok":true,"elements":n}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_scene(json: &str) -> String {
    match load_scene_json(json) {
        Ok(scene) => json!({ "ok": true, "elements": scene.selectable_ids().len() }).to_string(),
        Err(e) => json!({ "ok": false, "error": e.to_string() }).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    const DOC: &str = r#"{ "width": 100, "height": 100, "groups": [
        { "id": 1, "panel": true, "children": [
            { "kind": "image", "bbox": { "x": 0, "y": 0, "width": 100, "height": 100 } }
        ]},
        { "id": 5, "strokeWidth": 1, "children": [
            { "kind": "path", "d": "M0,0 H20 V20 H0 Z", "transform": [1, 0, 0, 1, 10, 10] }
        ]}
    ]}"#;

    fn canvas() -> PanelCanvas {
        let mut canvas = PanelCanvas::new("").unwrap();
        let reply: Value = serde_json::from_str(&canvas.load_scene(DOC, true, "")).unwrap();
        assert_eq!(reply["ok"], true);
        // The first load frames the panel; tests work at identity.
        canvas.set_zoom(1.0, 0.0, 0.0);
        canvas
    }

    #[test]
    fn click_reports_selection_json() {
        let mut canvas = canvas();
        // Identity camera: scene (20, 20) is screen (20, 80).
        let down: Value =
            serde_json::from_str(&canvas.handle_pointer_down(20.0, 80.0, 0, false, false, false, false))
                .unwrap();
        assert_eq!(down, json!({ "ok": true, "notifications": [] }));
        assert_eq!(canvas.get_state(), "move");

        let up: Value = serde_json::from_str(&canvas.handle_pointer_up(20.0, 80.0)).unwrap();
        assert_eq!(up["notifications"][0], json!({ "type": "selectionChanged", "data": [5] }));
        assert_eq!(canvas.get_selection_json(), "[5]");
    }

    #[test]
    fn stale_gesture_is_reported_not_thrown() {
        let mut canvas = canvas();
        canvas.set_readiness(false, true);
        let reply: Value =
            serde_json::from_str(&canvas.handle_pointer_down(20.0, 80.0, 0, false, false, false, false))
                .unwrap();
        assert_eq!(reply["ok"], false);
        assert!(reply["error"].as_str().unwrap().contains("rejected"));
    }

    #[test]
    fn preserve_camera_restores_selection() {
        let mut canvas = canvas();
        canvas.set_zoom(2.0, 3.0, 4.0);
        canvas.load_scene(DOC, true, "[5, 42]");
        assert_eq!(canvas.get_selection_json(), "[5]");
        let view: Value = serde_json::from_str(&canvas.get_view_json()).unwrap();
        assert_eq!(view, json!({ "k": 2.0, "x": 3.0, "y": 4.0 }));
        let deco: Value = serde_json::from_str(&canvas.get_decorations_json()).unwrap();
        assert_eq!(deco["crossMarker"][4], 10.0);
    }

    #[test]
    fn bad_documents_are_reported() {
        let mut canvas = PanelCanvas::new("").unwrap();
        let reply: Value = serde_json::from_str(&canvas.load_scene("{", false, "")).unwrap();
        assert_eq!(reply["ok"], false);

        let reply: Value = serde_json::from_str(&canvas.load_scene(DOC, true, "[oops")).unwrap();
        assert!(reply["error"].as_str().unwrap().starts_with("invalid selection"));

        let ok: Value = serde_json::from_str(&validate_scene(DOC)).unwrap();
        assert_eq!(ok, json!({ "ok": true, "elements": 1 }));
    }

    #[test]
    fn config_overrides_apply() {
        assert_eq!(parse_config("").unwrap(), EngineConfig::default());
        assert_eq!(parse_config(r#"{ "maxZoom": 3 }"#).unwrap().max_zoom, 3.0);
        assert!(parse_config("42").is_err());
    }

    #[test]
    fn view_matrix_flips_y() {
        let canvas = canvas();
        assert_eq!(canvas.get_view_matrix(), vec![1.0, 0.0, 0.0, -1.0, 0.0, 100.0]);
        assert_eq!(canvas.scene_to_screen(10.0, 10.0), vec![10.0, 90.0]);
    }
}

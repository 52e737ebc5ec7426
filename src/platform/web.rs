//! Browser bindings
//!
//! A thin wasm-bindgen wrapper around `BubbleField<BubblePayload>`. Payloads,
//! configs and snapshots cross the boundary as JSON strings so the JS side
//! needs no generated types.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::config::SimConfig;
use crate::sim::{Bounds, BubbleField, BubblePayload, PressOutcome};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // A second init (e.g. hot reload) fails harmlessly
    let _ = console_log::init_with_level(log::Level::Info);
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Bubble field handle owned by the JS host
#[wasm_bindgen]
pub struct WebBubbleField {
    field: BubbleField<BubblePayload>,
}

#[wasm_bindgen]
impl WebBubbleField {
    /// Create a field from an optional JSON config (missing fields take defaults)
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WebBubbleField, JsValue> {
        let config = match config_json {
            Some(json) => SimConfig::from_json(&json).map_err(to_js)?,
            None => SimConfig::default(),
        };
        Ok(Self {
            field: BubbleField::try_new(config).map_err(to_js)?,
        })
    }

    /// Build one bubble per payload in `payloads_json` (an array of
    /// `{title, stat, description}`)
    pub fn initialize(&mut self, width: f32, height: f32, payloads_json: &str) -> Result<(), JsValue> {
        let payloads: Vec<BubblePayload> = serde_json::from_str(payloads_json).map_err(to_js)?;
        self.field.initialize(Bounds::new(width, height), payloads);
        Ok(())
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.field.resize(Bounds::new(width, height));
    }

    /// Advance by `dt` seconds and return the snapshot as JSON
    pub fn step(&mut self, dt: f32, x: f32, y: f32, has_pointer: bool) -> Result<String, JsValue> {
        let pointer = has_pointer.then(|| Vec2::new(x, y));
        let snapshot = self.field.step(dt, pointer);
        serde_json::to_string(&snapshot).map_err(to_js)
    }

    /// Current snapshot as JSON without advancing
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.field.snapshot()).map_err(to_js)
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.field.pointer_moved(Vec2::new(x, y));
    }

    pub fn pointer_left(&mut self) {
        self.field.pointer_left();
    }

    /// Returns the id of the bubble expanded by this press, if any
    pub fn pointer_pressed(&mut self, x: f32, y: f32) -> Option<u32> {
        match self.field.pointer_pressed(Vec2::new(x, y)) {
            PressOutcome::Expanded(id) => Some(id.0),
            PressOutcome::Collapsed(_) | PressOutcome::Ignored => None,
        }
    }

    /// Register `callback(payloadJson)` for selection events
    pub fn on_select(&mut self, callback: js_sys::Function) {
        self.field.on_select(move |payload: &BubblePayload| {
            let json = match serde_json::to_string(payload) {
                Ok(json) => json,
                Err(e) => {
                    log::error!("Failed to encode selection payload: {e}");
                    return;
                }
            };
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                log::warn!("Selection callback threw: {:?}", e);
            }
        });
    }

    /// Release all state, including the callbacks handed over by the host
    pub fn destroy(&mut self) {
        self.field.destroy();
    }
}

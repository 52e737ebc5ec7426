//! Platform abstraction layer
//!
//! The simulation itself is platform free. On wasm32 the `web` module exposes
//! it to a browser host that owns the canvas, the frame loop and pointer
//! capture.

#[cfg(target_arch = "wasm32")]
pub mod web;

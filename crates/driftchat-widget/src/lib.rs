// Driftchat Widget — Browser embed
//
// wasm-bindgen adapter that puts the driftchat-core state machine on a real
// page: a floating trigger button and a chat panel, both draggable, talking
// to the gateway's /api/chat endpoint. All behavior rules live in
// driftchat-core; this crate only mirrors state into DOM and feeds DOM
// events back in.

mod app;
mod dom;
mod listeners;

use wasm_bindgen::prelude::*;

/// Module init: panic messages to the console, `log` macros to the console.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    log::debug!("[widget] module initialized");
}

/// Mount the widget on the current page.
///
/// `options` is a plain JS object mirroring `WidgetOptions`; anything absent
/// falls back to its default, and `null`/`undefined` means all defaults.
/// Mounting twice is a warning and a no-op.
#[wasm_bindgen]
pub fn mount(options: JsValue) -> Result<(), JsValue> {
    let options = if options.is_null() || options.is_undefined() {
        driftchat_core::WidgetOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsValue::from_str(&format!("invalid widget options: {e}")))?
    };
    app::mount(options)
}

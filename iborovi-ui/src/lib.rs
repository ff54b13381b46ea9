//! iborovi site bindings
//!
//! Browser side of the iborovi site, compiled to WebAssembly. Binds the chat
//! widget controller to the page DOM and local storage, and keeps the live
//! status counters up to date.
//!
//! # Usage
//!
//! Nothing is mounted implicitly. The page script composes what it needs:
//!
//! ```js
//! import init, { mountMessenger, startStatusPolling } from "./pkg/iborovi_ui.js";
//!
//! await init();
//! const messenger = mountMessenger();      // undefined if the widget is absent
//! messenger?.setUsername("viewer42");
//! const status = startStatusPolling("iborovi");
//! ```
//!
//! Every returned handle owns its listeners and timers; calling `free()` on
//! it detaches them.

use tracing_subscriber::layer::SubscriberExt;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

mod dom;
mod listeners;
mod messenger;
mod status;
mod storage;

pub use messenger::{mount_messenger, Messenger};
pub use status::{apply_status, start_status_polling, StatusPolling};
pub use storage::LocalStorage;

#[wasm_bindgen(start)]
pub fn start() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();
    init_logging();
}

/// Route `tracing` events from the chat and status code to the browser
/// console
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_logging() {
    let config = tracing_wasm::WASMLayerConfigBuilder::new()
        .set_max_level(tracing::Level::INFO)
        .set_report_logs_in_timings(false)
        .build();

    let subscriber = tracing_subscriber::registry().with(tracing_wasm::WASMLayer::new(config));
    let _ = tracing::subscriber::set_global_default(subscriber);
}

pub(crate) fn warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}

/// Best-effort text of a thrown JS value
pub(crate) fn js_error_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

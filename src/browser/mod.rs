//! `web-sys` implementations of the lifecycle seams.
//!
//! - [`BrowserCacheStorage`], [`BrowserCache`] - `self.caches` and its stores
//! - [`BrowserTransport`], [`WorkerRequest`], [`WorkerResponse`] - Fetch API
//! - [`WorkerHost`] - `skipWaiting`, `clients.claim` and `spawn_local`

mod cache;
mod fetch;
mod scope;

pub use cache::{BrowserCache, BrowserCacheStorage};
pub use fetch::{BrowserTransport, WorkerRequest, WorkerResponse};
pub use scope::{WorkerHost, global_scope};

use wasm_bindgen::{JsCast, JsValue};

/// Best-effort message from a rejected promise or thrown value.
pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(message) = value.as_string() {
        return message;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{:?}", value)
}

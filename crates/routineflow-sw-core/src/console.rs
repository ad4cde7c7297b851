//! Browser console logging.
//!
//! Calls into `web_sys::console` only on wasm32; native builds (tests) are
//! silent.

#[cfg(target_arch = "wasm32")]
use crate::config::LOG_PREFIX;

#[cfg(target_arch = "wasm32")]
pub fn info(message: &str) {
    web_sys::console::log_1(&format!("{} {}", LOG_PREFIX, message).into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn info(_message: &str) {}

#[cfg(target_arch = "wasm32")]
pub fn warn(message: &str) {
    web_sys::console::warn_1(&format!("{} {}", LOG_PREFIX, message).into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn warn(_message: &str) {}

#[cfg(target_arch = "wasm32")]
pub fn error(message: &str) {
    web_sys::console::error_1(&format!("{} {}", LOG_PREFIX, message).into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn error(_message: &str) {}

//! Service worker global scope access.

use futures::future::LocalBoxFuture;
use routineflow_sw_core::{Host, console};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::ServiceWorkerGlobalScope;

use super::js_message;

/// The global `self` of the running service worker.
///
/// Fails outside a service worker context (window, dedicated worker).
pub fn global_scope() -> Result<ServiceWorkerGlobalScope, JsValue> {
    js_sys::global()
        .dyn_into::<ServiceWorkerGlobalScope>()
        .map_err(JsValue::from)
}

/// Lifecycle signals routed to the worker scope.
pub struct WorkerHost {
    scope: ServiceWorkerGlobalScope,
}

impl WorkerHost {
    pub fn new(scope: ServiceWorkerGlobalScope) -> Self {
        Self { scope }
    }
}

impl Host for WorkerHost {
    fn skip_waiting(&self) {
        // The returned promise only settles once the worker is activating.
        if let Err(e) = self.scope.skip_waiting() {
            console::warn(&format!("skipWaiting failed: {}", js_message(&e)));
        }
    }

    fn claim_clients(&self) {
        let _ = self.scope.clients().claim();
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

//! routineflow service worker.
//!
//! Wires the browser's `install`, `activate` and `fetch` events to
//! [`CacheLifecycle`]. The JS shim that loads this module must instantiate it
//! during the worker's initial script evaluation, otherwise the browser
//! ignores listeners added afterwards.

pub mod browser;

use std::rc::Rc;

use routineflow_sw_core::{CacheConfig, CacheLifecycle, console};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::{ExtendableEvent, FetchEvent};

use browser::{BrowserCacheStorage, BrowserTransport, WorkerHost, WorkerRequest, global_scope};

/// The lifecycle as deployed in the browser.
pub type WorkerLifecycle = CacheLifecycle<BrowserCacheStorage, BrowserTransport, WorkerHost>;

/// Build the lifecycle for the current deployment from the worker scope.
pub fn worker_lifecycle() -> Result<WorkerLifecycle, JsValue> {
    let scope = global_scope()?;
    let caches = scope.caches()?;

    Ok(CacheLifecycle::new(
        CacheConfig::default(),
        BrowserCacheStorage::new(caches),
        BrowserTransport::new(scope.clone()),
        WorkerHost::new(scope),
    ))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let scope = global_scope()?;
    let lifecycle = Rc::new(worker_lifecycle()?);

    let on_install = {
        let lifecycle = Rc::clone(&lifecycle);
        Closure::<dyn FnMut(ExtendableEvent)>::new(move |event: ExtendableEvent| {
            let lifecycle = Rc::clone(&lifecycle);
            let promise = future_to_promise(async move {
                lifecycle
                    .install()
                    .await
                    .map(|()| JsValue::UNDEFINED)
                    .map_err(|e| JsValue::from_str(&e.to_string()))
            });
            if let Err(e) = event.wait_until(&promise) {
                console::error(&format!("install waitUntil rejected: {:?}", e));
            }
        })
    };

    let on_activate = {
        let lifecycle = Rc::clone(&lifecycle);
        Closure::<dyn FnMut(ExtendableEvent)>::new(move |event: ExtendableEvent| {
            let lifecycle = Rc::clone(&lifecycle);
            let promise = future_to_promise(async move {
                lifecycle
                    .activate()
                    .await
                    .map(|()| JsValue::UNDEFINED)
                    .map_err(|e| JsValue::from_str(&e.to_string()))
            });
            if let Err(e) = event.wait_until(&promise) {
                console::error(&format!("activate waitUntil rejected: {:?}", e));
            }
        })
    };

    let on_fetch = {
        let lifecycle = Rc::clone(&lifecycle);
        Closure::<dyn FnMut(FetchEvent)>::new(move |event: FetchEvent| {
            let lifecycle = Rc::clone(&lifecycle);
            let request = WorkerRequest::from(event.request());
            let promise = future_to_promise(async move {
                let served = lifecycle
                    .handle_fetch(request)
                    .await
                    .map_err(|e| JsValue::from_str(&e.to_string()))?;
                Ok(served.into_response().into_raw().into())
            });
            if let Err(e) = event.respond_with(&promise) {
                console::error(&format!("respondWith rejected: {:?}", e));
            }
        })
    };

    scope.add_event_listener_with_callback("install", on_install.as_ref().unchecked_ref())?;
    scope.add_event_listener_with_callback("activate", on_activate.as_ref().unchecked_ref())?;
    scope.add_event_listener_with_callback("fetch", on_fetch.as_ref().unchecked_ref())?;

    // Listeners live as long as the worker.
    on_install.forget();
    on_activate.forget();
    on_fetch.forget();

    console::info("Worker started");
    Ok(())
}

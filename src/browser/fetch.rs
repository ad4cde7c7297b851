//! Fetch API bindings.
//!
//! Requests and responses stay as JS handles; bodies never cross into Rust.

use routineflow_sw_core::config::{OFFLINE_CONTENT_TYPE, OFFLINE_HTML};
use routineflow_sw_core::{
    CacheError, FetchError, HttpRequest, HttpResponse, ResponseKind, Transport,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, ResponseInit, ResponseType, ServiceWorkerGlobalScope};

use super::js_message;

/// An intercepted `FetchEvent.request` or a seed request.
#[derive(Debug, Clone)]
pub struct WorkerRequest(web_sys::Request);

impl WorkerRequest {
    pub fn as_raw(&self) -> &web_sys::Request {
        &self.0
    }
}

impl From<web_sys::Request> for WorkerRequest {
    fn from(request: web_sys::Request) -> Self {
        Self(request)
    }
}

impl HttpRequest for WorkerRequest {
    fn get(url: &str) -> Result<Self, FetchError> {
        web_sys::Request::new_with_str(url)
            .map(Self)
            .map_err(|e| FetchError::InvalidRequest {
                url: url.to_string(),
                message: js_message(&e),
            })
    }

    fn method(&self) -> String {
        self.0.method()
    }

    fn url(&self) -> String {
        self.0.url()
    }
}

/// A network, cached or synthesized `Response`.
#[derive(Debug, Clone)]
pub struct WorkerResponse(web_sys::Response);

impl WorkerResponse {
    pub fn as_raw(&self) -> &web_sys::Response {
        &self.0
    }

    pub fn into_raw(self) -> web_sys::Response {
        self.0
    }
}

impl From<web_sys::Response> for WorkerResponse {
    fn from(response: web_sys::Response) -> Self {
        Self(response)
    }
}

impl HttpResponse for WorkerResponse {
    fn status(&self) -> u16 {
        self.0.status()
    }

    fn kind(&self) -> ResponseKind {
        match self.0.type_() {
            ResponseType::Basic => ResponseKind::Basic,
            ResponseType::Cors => ResponseKind::Cors,
            ResponseType::Error => ResponseKind::Error,
            ResponseType::Opaque => ResponseKind::Opaque,
            ResponseType::Opaqueredirect => ResponseKind::OpaqueRedirect,
            _ => ResponseKind::Default,
        }
    }

    /// `Response.clone()`: tees the body stream so both copies can be read.
    fn duplicate(&self) -> Result<Self, CacheError> {
        web_sys::Response::clone(&self.0)
            .map(Self)
            .map_err(|e| CacheError::Clone(js_message(&e)))
    }

    fn offline_notice() -> Result<Self, FetchError> {
        let build_error = |e| FetchError::ResponseBuild(js_message(&e));

        let headers = Headers::new().map_err(build_error)?;
        headers
            .set("Content-Type", OFFLINE_CONTENT_TYPE)
            .map_err(build_error)?;

        let init = ResponseInit::new();
        init.set_status(200);
        init.set_headers(&headers);

        web_sys::Response::new_with_opt_str_and_init(Some(OFFLINE_HTML), &init)
            .map(Self)
            .map_err(build_error)
    }
}

/// `fetch()` on the worker's global scope.
pub struct BrowserTransport {
    scope: ServiceWorkerGlobalScope,
}

impl BrowserTransport {
    pub fn new(scope: ServiceWorkerGlobalScope) -> Self {
        Self { scope }
    }
}

impl Transport for BrowserTransport {
    type Request = WorkerRequest;
    type Response = WorkerResponse;

    async fn fetch(&self, request: &WorkerRequest) -> Result<WorkerResponse, FetchError> {
        let value = JsFuture::from(self.scope.fetch_with_request(request.as_raw()))
            .await
            .map_err(|e| FetchError::Network(js_message(&e)))?;
        value
            .dyn_into::<web_sys::Response>()
            .map(WorkerResponse)
            .map_err(|_| FetchError::Network("fetch() did not resolve to a Response".to_string()))
    }
}

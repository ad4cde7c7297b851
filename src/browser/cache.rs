//! Cache Storage API bindings.

use js_sys::Array;
use routineflow_sw_core::{Cache, CacheError, CacheStorage};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use super::fetch::{WorkerRequest, WorkerResponse};
use super::js_message;

/// The worker's `self.caches`.
pub struct BrowserCacheStorage {
    caches: web_sys::CacheStorage,
}

impl BrowserCacheStorage {
    pub fn new(caches: web_sys::CacheStorage) -> Self {
        Self { caches }
    }
}

impl CacheStorage for BrowserCacheStorage {
    type Cache = BrowserCache;

    async fn open(&self, name: &str) -> Result<BrowserCache, CacheError> {
        let open_error = |message| CacheError::Open {
            name: name.to_string(),
            message,
        };

        let value = JsFuture::from(self.caches.open(name))
            .await
            .map_err(|e| open_error(js_message(&e)))?;
        let cache = value
            .dyn_into::<web_sys::Cache>()
            .map_err(|_| open_error("open() did not resolve to a Cache".to_string()))?;
        Ok(BrowserCache { cache })
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let value = JsFuture::from(self.caches.keys())
            .await
            .map_err(|e| CacheError::Keys(js_message(&e)))?;
        let names = value
            .dyn_into::<Array>()
            .map_err(|_| CacheError::Keys("keys() did not resolve to an array".to_string()))?;
        Ok(names.iter().filter_map(|name| name.as_string()).collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        let deleted = JsFuture::from(self.caches.delete(name))
            .await
            .map_err(|e| CacheError::Delete {
                name: name.to_string(),
                message: js_message(&e),
            })?;
        Ok(deleted.as_bool().unwrap_or(false))
    }
}

/// One opened `Cache`.
pub struct BrowserCache {
    cache: web_sys::Cache,
}

impl Cache for BrowserCache {
    type Request = WorkerRequest;
    type Response = WorkerResponse;

    async fn lookup(&self, request: &WorkerRequest) -> Result<Option<WorkerResponse>, CacheError> {
        let value = JsFuture::from(self.cache.match_with_request(request.as_raw()))
            .await
            .map_err(|e| CacheError::Lookup(js_message(&e)))?;
        if value.is_undefined() {
            return Ok(None);
        }
        value
            .dyn_into::<web_sys::Response>()
            .map(|response| Some(WorkerResponse::from(response)))
            .map_err(|_| CacheError::Lookup("match() did not resolve to a Response".to_string()))
    }

    async fn put(
        &self,
        request: &WorkerRequest,
        response: WorkerResponse,
    ) -> Result<(), CacheError> {
        JsFuture::from(self.cache.put_with_request(request.as_raw(), response.as_raw()))
            .await
            .map_err(|e| CacheError::Write(js_message(&e)))?;
        Ok(())
    }
}

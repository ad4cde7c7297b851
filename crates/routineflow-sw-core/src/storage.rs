//! Cache store seams.
//!
//! [`CacheStorage`] is the registry of named stores (`self.caches` in a
//! worker); [`Cache`] is one opened store. Futures are not `Send`: every
//! backend runs on a single-threaded event loop.

use crate::error::CacheError;
use crate::http::{HttpRequest, HttpResponse};

/// One named store mapping requests to responses.
#[allow(async_fn_in_trait)]
pub trait Cache {
    type Request: HttpRequest;
    type Response: HttpResponse;

    /// Exact-key lookup. `Ok(None)` on a miss.
    async fn lookup(&self, request: &Self::Request) -> Result<Option<Self::Response>, CacheError>;

    /// Store `response` under `request`, replacing any previous entry.
    async fn put(
        &self,
        request: &Self::Request,
        response: Self::Response,
    ) -> Result<(), CacheError>;
}

/// Registry of named stores.
#[allow(async_fn_in_trait)]
pub trait CacheStorage {
    type Cache: Cache;

    /// Open the store called `name`, creating it if absent.
    async fn open(&self, name: &str) -> Result<Self::Cache, CacheError>;

    /// Names of all existing stores.
    async fn keys(&self) -> Result<Vec<String>, CacheError>;

    /// Delete the store called `name`. `Ok(false)` if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, CacheError>;
}

//! In-memory implementations of every seam, for tests and native embedding.
//!
//! All handles are cheap clones over shared state, so a test can keep one
//! copy for inspection while the lifecycle owns another.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::error::{CacheError, FetchError};
use crate::host::{Host, Transport};
use crate::http::{HttpRequest, Request, Response};
use crate::storage::{Cache, CacheStorage};

// =============================================================================
// Cache Storage
// =============================================================================

/// Injected failures, shared by the registry and every store it hands out.
#[derive(Default)]
struct Faults {
    keys: Cell<bool>,
    lookups: Cell<bool>,
    writes: Cell<bool>,
    failing_writes: RefCell<HashSet<String>>,
    failing_deletes: RefCell<HashSet<String>>,
}

/// Cache registry backed by ordered maps.
#[derive(Clone, Default)]
pub struct MemoryCacheStorage {
    caches: Rc<RefCell<BTreeMap<String, MemoryCache>>>,
    faults: Rc<Faults>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of existing stores, sorted.
    pub fn cache_names(&self) -> Vec<String> {
        self.caches.borrow().keys().cloned().collect()
    }

    pub fn has_cache(&self, name: &str) -> bool {
        self.caches.borrow().contains_key(name)
    }

    /// Stored response for `url` in store `name`, if both exist.
    pub fn entry(&self, name: &str, url: &str) -> Option<Response> {
        let caches = self.caches.borrow();
        let cache = caches.get(name)?;
        cache.entries.borrow().get(url).cloned()
    }

    /// Number of entries in store `name` (zero if absent).
    pub fn entry_count(&self, name: &str) -> usize {
        self.caches
            .borrow()
            .get(name)
            .map_or(0, |cache| cache.entries.borrow().len())
    }

    /// Write an entry directly, creating the store if needed.
    pub fn insert(&self, name: &str, url: &str, response: Response) {
        let cache = self.open_or_create(name);
        cache.entries.borrow_mut().insert(url.to_string(), response);
    }

    /// Create an empty store.
    pub fn create(&self, name: &str) {
        self.open_or_create(name);
    }

    /// Make listing the stores fail.
    pub fn fail_keys(&self, fail: bool) {
        self.faults.keys.set(fail);
    }

    /// Make every lookup in any store fail.
    pub fn fail_lookups(&self, fail: bool) {
        self.faults.lookups.set(fail);
    }

    /// Make every write to any store fail.
    pub fn fail_writes(&self, fail: bool) {
        self.faults.writes.set(fail);
    }

    /// Make writes of `url` fail while other URLs still succeed.
    pub fn fail_write(&self, url: &str) {
        self.faults.failing_writes.borrow_mut().insert(url.to_string());
    }

    /// Make every future deletion of `name` fail.
    pub fn fail_delete(&self, name: &str) {
        self.faults.failing_deletes.borrow_mut().insert(name.to_string());
    }

    fn open_or_create(&self, name: &str) -> MemoryCache {
        self.caches
            .borrow_mut()
            .entry(name.to_string())
            .or_insert_with(|| MemoryCache {
                entries: Rc::default(),
                faults: Rc::clone(&self.faults),
            })
            .clone()
    }
}

impl CacheStorage for MemoryCacheStorage {
    type Cache = MemoryCache;

    async fn open(&self, name: &str) -> Result<MemoryCache, CacheError> {
        Ok(self.open_or_create(name))
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        if self.faults.keys.get() {
            return Err(CacheError::Keys("storage unavailable".to_string()));
        }
        Ok(self.cache_names())
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        if self.faults.failing_deletes.borrow().contains(name) {
            return Err(CacheError::Delete {
                name: name.to_string(),
                message: "deletion refused".to_string(),
            });
        }
        Ok(self.caches.borrow_mut().remove(name).is_some())
    }
}

/// One store, keyed by URL.
///
/// Mirrors the platform: only `GET` requests can be matched or stored, and a
/// handle stays usable after its store is deleted from the registry.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Rc<RefCell<HashMap<String, Response>>>,
    faults: Rc<Faults>,
}

impl Cache for MemoryCache {
    type Request = Request;
    type Response = Response;

    async fn lookup(&self, request: &Request) -> Result<Option<Response>, CacheError> {
        if self.faults.lookups.get() {
            return Err(CacheError::Lookup("storage unavailable".to_string()));
        }
        if !request.is_cacheable() {
            return Ok(None);
        }
        Ok(self.entries.borrow().get(&request.url).cloned())
    }

    async fn put(&self, request: &Request, response: Response) -> Result<(), CacheError> {
        if !request.is_cacheable() {
            return Err(CacheError::Write(format!(
                "Request method '{}' is unsupported",
                request.method
            )));
        }
        if self.faults.writes.get() || self.faults.failing_writes.borrow().contains(&request.url) {
            return Err(CacheError::Write("quota exceeded".to_string()));
        }
        self.entries.borrow_mut().insert(request.url.clone(), response);
        Ok(())
    }
}

// =============================================================================
// Transport
// =============================================================================

#[derive(Default)]
struct TransportState {
    routes: HashMap<String, Result<Response, FetchError>>,
    calls: Vec<String>,
}

/// Scripted network: each URL answers with a fixed response or error.
///
/// Unrouted URLs fail as network errors.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Rc<RefCell<TransportState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `response`.
    pub fn route(&self, url: &str, response: Response) {
        self.state
            .borrow_mut()
            .routes
            .insert(url.to_string(), Ok(response));
    }

    /// Fail `url` with a network error.
    pub fn fail(&self, url: &str, message: &str) {
        self.state.borrow_mut().routes.insert(
            url.to_string(),
            Err(FetchError::Network(message.to_string())),
        );
    }

    /// URLs fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.borrow().calls.len()
    }
}

impl Transport for MockTransport {
    type Request = Request;
    type Response = Response;

    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(request.url.clone());
        state
            .routes
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Network(format!("no route to {}", request.url))))
    }
}

// =============================================================================
// Host
// =============================================================================

#[derive(Default)]
struct HostState {
    skip_waiting: Cell<usize>,
    claims: Cell<usize>,
    pending: RefCell<Vec<LocalBoxFuture<'static, ()>>>,
}

/// Host that counts lifecycle signals and queues background tasks.
///
/// Spawned tasks do not run until [`MockHost::run_pending`] is awaited, which
/// makes "returned before the write finished" observable.
#[derive(Clone, Default)]
pub struct MockHost {
    state: Rc<HostState>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_waiting_calls(&self) -> usize {
        self.state.skip_waiting.get()
    }

    pub fn claim_calls(&self) -> usize {
        self.state.claims.get()
    }

    pub fn pending_tasks(&self) -> usize {
        self.state.pending.borrow().len()
    }

    /// Drive queued tasks (and any they spawn) to completion.
    pub async fn run_pending(&self) {
        loop {
            let tasks = std::mem::take(&mut *self.state.pending.borrow_mut());
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                task.await;
            }
        }
    }
}

impl Host for MockHost {
    fn skip_waiting(&self) {
        self.state.skip_waiting.set(self.state.skip_waiting.get() + 1);
    }

    fn claim_clients(&self) {
        self.state.claims.set(self.state.claims.get() + 1);
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        self.state.pending.borrow_mut().push(task);
    }
}

//! The install → activate → fetch lifecycle.
//!
//! [`CacheLifecycle`] owns nothing but handles: the store registry, the
//! network transport and the host. Each lifecycle event is an independent
//! async call; the only state shared between fetch events is the store
//! itself.

use std::rc::Rc;

use futures::FutureExt;
use futures::future::{join_all, try_join_all};

use crate::config::CacheConfig;
use crate::console;
use crate::error::{CacheError, FetchError, InstallError};
use crate::host::{Host, Transport};
use crate::http::{HttpRequest, HttpResponse};
use crate::storage::{Cache, CacheStorage};

/// Request type stored by the caches of `S`.
pub type RequestOf<S> = <<S as CacheStorage>::Cache as Cache>::Request;

/// Response type stored by the caches of `S`.
pub type ResponseOf<S> = <<S as CacheStorage>::Cache as Cache>::Response;

/// Where a fetch response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// Current store hit; the network was not touched.
    Cache,
    /// Network response, cacheable or not.
    Network,
    /// Synthesized offline notice after a transport failure.
    Offline,
}

/// Response handed back to the requesting client.
#[derive(Debug)]
pub struct FetchResponse<R> {
    pub response: R,
    pub source: ResponseSource,
}

impl<R> FetchResponse<R> {
    fn new(response: R, source: ResponseSource) -> Self {
        Self { response, source }
    }

    pub fn into_response(self) -> R {
        self.response
    }
}

/// Versioned cache manager driven by the host's lifecycle events.
pub struct CacheLifecycle<S, T, H> {
    config: CacheConfig,
    storage: Rc<S>,
    transport: T,
    host: H,
}

impl<S, T, H> CacheLifecycle<S, T, H>
where
    S: CacheStorage + 'static,
    S::Cache: 'static,
    RequestOf<S>: 'static,
    ResponseOf<S>: 'static,
    T: Transport<Request = RequestOf<S>, Response = ResponseOf<S>>,
    H: Host,
{
    pub fn new(config: CacheConfig, storage: S, transport: T, host: H) -> Self {
        Self {
            config,
            storage: Rc::new(storage),
            transport,
            host,
        }
    }

    // =========================================================================
    // Install
    // =========================================================================

    /// Seed the current store with the app shell.
    ///
    /// Every seed is fetched before anything is written, so a single failing
    /// URL leaves the store without any of them. If a write fails, the
    /// partially seeded store is deleted. The host is told to skip waiting
    /// regardless of the outcome.
    pub async fn install(&self) -> Result<(), InstallError> {
        console::info("Installing...");
        self.host.skip_waiting();

        let result = self.seed().await;
        if let Err(err) = &result {
            console::error(&format!("Failed to cache during install: {}", err));
        }
        result
    }

    async fn seed(&self) -> Result<(), InstallError> {
        let cache = self
            .storage
            .open(self.config.version())
            .await
            .map_err(InstallError::Open)?;

        console::info("Caching app shell");
        let fetches = self
            .config
            .seed_urls()
            .iter()
            .map(|url| self.fetch_seed(url));
        let entries = try_join_all(fetches).await?;

        let cache = &cache;
        let writes = entries
            .into_iter()
            .map(|(request, response)| async move { cache.put(&request, response).await });
        if let Err(err) = try_join_all(writes).await {
            let _ = self.storage.delete(self.config.version()).await;
            return Err(InstallError::Write(err));
        }
        Ok(())
    }

    async fn fetch_seed(&self, url: &str) -> Result<(RequestOf<S>, ResponseOf<S>), InstallError> {
        let seed_error = |source| InstallError::Seed {
            url: url.to_string(),
            source,
        };

        let request = <RequestOf<S> as HttpRequest>::get(url).map_err(seed_error)?;
        let response = self.transport.fetch(&request).await.map_err(seed_error)?;
        if !response.is_ok() {
            return Err(seed_error(FetchError::BadStatus(response.status())));
        }
        Ok((request, response))
    }

    // =========================================================================
    // Activate
    // =========================================================================

    /// Delete every store left behind by another version and claim clients.
    ///
    /// Deletions run concurrently and their results are discarded; a store
    /// that fails to delete lingers until the next activation.
    pub async fn activate(&self) -> Result<(), CacheError> {
        console::info("Activating...");
        self.host.claim_clients();

        let names = self.storage.keys().await.inspect_err(|err| {
            console::error(&format!("Failed to enumerate caches: {}", err));
        })?;

        let deletions = names
            .into_iter()
            .filter(|name| self.config.is_stale(name))
            .map(|name| async move {
                console::info(&format!("Deleting old cache: {}", name));
                let _ = self.storage.delete(&name).await;
            });
        join_all(deletions).await;
        Ok(())
    }

    // =========================================================================
    // Fetch
    // =========================================================================

    /// Answer an intercepted request: cache first, then network.
    ///
    /// A cacheable network response is duplicated and one copy is written
    /// back in a background task that this call never waits on. A transport
    /// failure yields the offline notice; the only error is failing to build
    /// that notice.
    pub async fn handle_fetch(
        &self,
        request: RequestOf<S>,
    ) -> Result<FetchResponse<ResponseOf<S>>, FetchError> {
        if let Some(response) = self.lookup(&request).await {
            console::info(&format!("Serving from cache: {}", request.url()));
            return Ok(FetchResponse::new(response, ResponseSource::Cache));
        }

        console::info(&format!("Fetching from network: {}", request.url()));
        match self.transport.fetch(&request).await {
            Ok(response) => {
                if request.is_cacheable() && response.is_cacheable() {
                    match response.duplicate() {
                        Ok(copy) => self.write_back(request, copy),
                        Err(err) => console::warn(&format!(
                            "Not caching {}: {}",
                            request.url(),
                            err
                        )),
                    }
                }
                Ok(FetchResponse::new(response, ResponseSource::Network))
            }
            Err(err) => {
                console::error(&format!(
                    "Fetch failed and no cache found: {} ({})",
                    request.url(),
                    err
                ));
                let notice = <ResponseOf<S> as HttpResponse>::offline_notice()?;
                Ok(FetchResponse::new(notice, ResponseSource::Offline))
            }
        }
    }

    /// Look `request` up in the current store. Errors count as a miss.
    async fn lookup(&self, request: &RequestOf<S>) -> Option<ResponseOf<S>> {
        if !request.is_cacheable() {
            return None;
        }

        let result = match self.storage.open(self.config.version()).await {
            Ok(cache) => cache.lookup(request).await,
            Err(err) => Err(err),
        };
        result.unwrap_or_else(|err| {
            console::warn(&format!("Cache lookup failed for {}: {}", request.url(), err));
            None
        })
    }

    /// Persist `response` under `request` without blocking the caller.
    fn write_back(&self, request: RequestOf<S>, response: ResponseOf<S>) {
        let storage = Rc::clone(&self.storage);
        let version = self.config.version().to_string();

        let task = async move {
            let url = request.url();
            let result = match storage.open(&version).await {
                Ok(cache) => cache.put(&request, response).await,
                Err(err) => Err(err),
            };
            match result {
                Ok(()) => console::info(&format!("Caching new resource: {}", url)),
                Err(err) => console::warn(&format!("Failed to cache {}: {}", url, err)),
            }
        };
        self.host.spawn(task.boxed_local());
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Request, Response, ResponseKind};
    use crate::mock::{MemoryCacheStorage, MockHost, MockTransport};

    const VERSION: &str = "test-v1";

    struct Fixture {
        storage: MemoryCacheStorage,
        transport: MockTransport,
        host: MockHost,
        lifecycle: CacheLifecycle<MemoryCacheStorage, MockTransport, MockHost>,
    }

    fn fixture(seeds: &[&str]) -> Fixture {
        let storage = MemoryCacheStorage::new();
        let transport = MockTransport::new();
        let host = MockHost::new();
        let lifecycle = CacheLifecycle::new(
            CacheConfig::new(VERSION, seeds),
            storage.clone(),
            transport.clone(),
            host.clone(),
        );
        Fixture {
            storage,
            transport,
            host,
            lifecycle,
        }
    }

    #[tokio::test]
    async fn test_install_seeds_every_url() {
        let fx = fixture(&["/", "/index.html"]);
        fx.transport.route("/", Response::ok("root"));
        fx.transport.route("/index.html", Response::ok("index"));

        fx.lifecycle.install().await.unwrap();

        assert_eq!(fx.storage.entry(VERSION, "/").unwrap().text(), "root");
        assert_eq!(fx.storage.entry(VERSION, "/index.html").unwrap().text(), "index");
        assert_eq!(fx.host.skip_waiting_calls(), 1);
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let fx = fixture(&["/", "/missing.png"]);
        fx.transport.route("/", Response::ok("root"));
        fx.transport.fail("/missing.png", "connection refused");

        let err = fx.lifecycle.install().await.unwrap_err();

        assert!(matches!(err, InstallError::Seed { ref url, .. } if url == "/missing.png"));
        assert_eq!(fx.storage.entry_count(VERSION), 0);
        assert_eq!(fx.host.skip_waiting_calls(), 1);
    }

    #[tokio::test]
    async fn test_install_rejects_error_status() {
        let fx = fixture(&["/manifest.json"]);
        fx.transport
            .route("/manifest.json", Response::ok("").with_status(404));

        let err = fx.lifecycle.install().await.unwrap_err();

        assert_eq!(
            err,
            InstallError::Seed {
                url: "/manifest.json".to_string(),
                source: FetchError::BadStatus(404),
            }
        );
        assert!(fx.storage.entry(VERSION, "/manifest.json").is_none());
    }

    #[tokio::test]
    async fn test_install_write_failure() {
        let fx = fixture(&["/"]);
        fx.transport.route("/", Response::ok("root"));
        fx.storage.fail_writes(true);

        let err = fx.lifecycle.install().await.unwrap_err();
        assert!(matches!(err, InstallError::Write(CacheError::Write(_))));
    }

    #[tokio::test]
    async fn test_install_partial_write_leaves_no_seeds() {
        let fx = fixture(&["/", "/index.html", "/manifest.json"]);
        fx.transport.route("/", Response::ok("root"));
        fx.transport.route("/index.html", Response::ok("index"));
        fx.transport.route("/manifest.json", Response::ok("{}"));
        fx.storage.fail_write("/index.html");

        let err = fx.lifecycle.install().await.unwrap_err();

        assert!(matches!(err, InstallError::Write(CacheError::Write(_))));
        assert!(!fx.storage.has_cache(VERSION));
        assert!(fx.storage.entry(VERSION, "/").is_none());
        assert_eq!(fx.host.skip_waiting_calls(), 1);
    }

    #[tokio::test]
    async fn test_activate_deletes_stale_stores() {
        let fx = fixture(&[]);
        fx.storage.create("test-v0");
        fx.storage.create("other-app");
        fx.storage.create(VERSION);

        fx.lifecycle.activate().await.unwrap();

        assert_eq!(fx.storage.cache_names(), vec![VERSION.to_string()]);
        assert_eq!(fx.host.claim_calls(), 1);
    }

    #[tokio::test]
    async fn test_activate_tolerates_failed_deletion() {
        let fx = fixture(&[]);
        fx.storage.create("a-old");
        fx.storage.create("b-old");
        fx.storage.create("c-old");
        fx.storage.fail_delete("b-old");

        fx.lifecycle.activate().await.unwrap();

        assert_eq!(fx.storage.cache_names(), vec!["b-old".to_string()]);
        assert_eq!(fx.host.claim_calls(), 1);
    }

    #[tokio::test]
    async fn test_activate_keys_failure() {
        let fx = fixture(&[]);
        fx.storage.create("test-v0");
        fx.storage.fail_keys(true);

        let err = fx.lifecycle.activate().await.unwrap_err();

        assert!(matches!(err, CacheError::Keys(_)));
        assert!(fx.storage.has_cache("test-v0"));
        assert_eq!(fx.host.claim_calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_hit_skips_network() {
        let fx = fixture(&[]);
        fx.storage.insert(VERSION, "/app.js", Response::ok("cached"));
        fx.transport.route("/app.js", Response::ok("fresh"));

        let served = fx
            .lifecycle
            .handle_fetch(Request::new("GET", "/app.js"))
            .await
            .unwrap();

        assert_eq!(served.source, ResponseSource::Cache);
        assert_eq!(served.response.text(), "cached");
        assert_eq!(fx.transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_miss_writes_back_after_response() {
        let fx = fixture(&[]);
        let fresh = Response::ok("fresh").with_header("Content-Type", "text/javascript");
        fx.transport.route("/app.js", fresh.clone());

        let served = fx
            .lifecycle
            .handle_fetch(Request::new("GET", "/app.js"))
            .await
            .unwrap();

        assert_eq!(served.source, ResponseSource::Network);
        assert_eq!(served.response, fresh);
        // Write-back is queued, not yet applied.
        assert_eq!(fx.host.pending_tasks(), 1);
        assert!(fx.storage.entry(VERSION, "/app.js").is_none());

        fx.host.run_pending().await;
        assert_eq!(fx.storage.entry(VERSION, "/app.js"), Some(served.response));
    }

    #[tokio::test]
    async fn test_fetch_lookup_error_falls_back_to_network() {
        let fx = fixture(&[]);
        fx.storage.insert(VERSION, "/app.js", Response::ok("cached"));
        fx.storage.fail_lookups(true);
        fx.transport.route("/app.js", Response::ok("fresh"));

        let served = fx
            .lifecycle
            .handle_fetch(Request::new("GET", "/app.js"))
            .await
            .unwrap();

        assert_eq!(served.source, ResponseSource::Network);
        assert_eq!(served.response.text(), "fresh");
        assert_eq!(fx.transport.calls(), vec!["/app.js".to_string()]);

        fx.host.run_pending().await;
        assert_eq!(fx.storage.entry(VERSION, "/app.js").unwrap().text(), "fresh");
    }

    #[tokio::test]
    async fn test_fetch_passes_through_uncacheable() {
        let fx = fixture(&[]);
        let not_found = Response::ok("nope").with_status(404);
        let cross_origin = Response::ok("img").with_kind(ResponseKind::Cors);
        fx.transport.route("/missing", not_found.clone());
        fx.transport.route("https://cdn.example/img.png", cross_origin.clone());

        let first = fx
            .lifecycle
            .handle_fetch(Request::new("GET", "/missing"))
            .await
            .unwrap();
        let second = fx
            .lifecycle
            .handle_fetch(Request::new("GET", "https://cdn.example/img.png"))
            .await
            .unwrap();

        assert_eq!(first.response, not_found);
        assert_eq!(second.response, cross_origin);
        assert_eq!(fx.host.pending_tasks(), 0);
        assert_eq!(fx.storage.entry_count(VERSION), 0);
    }

    #[tokio::test]
    async fn test_fetch_offline_notice() {
        let fx = fixture(&[]);
        fx.transport.fail("/page", "offline");

        let served = fx
            .lifecycle
            .handle_fetch(Request::new("GET", "/page"))
            .await
            .unwrap();

        assert_eq!(served.source, ResponseSource::Offline);
        assert_eq!(served.response.header("Content-Type"), Some("text/html"));
        assert!(served.response.text().contains("You are offline!"));
        assert_eq!(fx.storage.entry_count(VERSION), 0);
        assert_eq!(fx.host.pending_tasks(), 0);
    }

    #[tokio::test]
    async fn test_fetch_never_caches_non_get() {
        let fx = fixture(&[]);
        fx.storage.insert(VERSION, "/api", Response::ok("cached"));
        fx.transport.route("/api", Response::ok("posted"));

        let served = fx
            .lifecycle
            .handle_fetch(Request::new("POST", "/api"))
            .await
            .unwrap();

        assert_eq!(served.source, ResponseSource::Network);
        assert_eq!(served.response.text(), "posted");
        assert_eq!(fx.host.pending_tasks(), 0);
        assert_eq!(fx.storage.entry(VERSION, "/api").unwrap().text(), "cached");
    }

    #[tokio::test]
    async fn test_failed_write_back_does_not_affect_response() {
        let fx = fixture(&[]);
        fx.transport.route("/app.css", Response::ok("body {}"));
        fx.storage.fail_writes(true);

        let served = fx
            .lifecycle
            .handle_fetch(Request::new("GET", "/app.css"))
            .await
            .unwrap();
        fx.host.run_pending().await;

        assert_eq!(served.response.text(), "body {}");
        assert!(fx.storage.entry(VERSION, "/app.css").is_none());
    }
}

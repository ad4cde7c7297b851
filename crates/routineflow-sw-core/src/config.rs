//! Cache configuration.
//!
//! Everything here is a deploy-time constant. Bump [`CACHE_VERSION`] whenever
//! any cached asset (HTML, CSS, JS, icons) changes so the next activation
//! purges the previous store.

// =============================================================================
// Versioning
// =============================================================================

/// Name of the current cache store.
pub const CACHE_VERSION: &str = "routineflow-v1";

// =============================================================================
// App Shell
// =============================================================================

/// Resources cached during install, in fetch order.
///
/// CSS and JS are inlined into `index.html`, so they ride along with it.
pub const SEED_URLS: &[&str] = &[
    "/",
    "/index.html",
    "/manifest.json",
    "/icons/icon-192x192.png",
    "/icons/icon-512x512.png",
    "https://cdn-icons-png.flaticon.com/512/2927/2927063.png",
];

// =============================================================================
// Offline Fallback
// =============================================================================

/// Body returned when a request misses the cache and the network is down.
pub const OFFLINE_HTML: &str =
    "<h1>You are offline!</h1><p>Please check your internet connection.</p>";

/// Content type of [`OFFLINE_HTML`].
pub const OFFLINE_CONTENT_TYPE: &str = "text/html";

/// Prefix for every console message emitted by the worker.
pub const LOG_PREFIX: &str = "[routineflow-sw]";

/// Version tag and seed list handed to [`crate::CacheLifecycle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    version: String,
    seed_urls: Vec<String>,
}

impl CacheConfig {
    pub fn new(version: impl Into<String>, seed_urls: &[&str]) -> Self {
        Self {
            version: version.into(),
            seed_urls: seed_urls.iter().map(|url| url.to_string()).collect(),
        }
    }

    /// Name of the store that is current for this deployment.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn seed_urls(&self) -> &[String] {
        &self.seed_urls
    }

    /// Whether `name` refers to a store from another deployment.
    pub fn is_stale(&self, name: &str) -> bool {
        name != self.version
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(CACHE_VERSION, SEED_URLS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_constants() {
        let config = CacheConfig::default();
        assert_eq!(config.version(), CACHE_VERSION);
        assert_eq!(config.seed_urls().len(), SEED_URLS.len());
        assert_eq!(config.seed_urls()[0], "/");
    }

    #[test]
    fn test_is_stale() {
        let config = CacheConfig::new("v2", &["/"]);
        assert!(config.is_stale("v1"));
        assert!(config.is_stale("V2"));
        assert!(!config.is_stale("v2"));
    }
}

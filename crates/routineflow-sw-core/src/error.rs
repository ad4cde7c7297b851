//! Error types for the cache lifecycle.
//!
//! - [`CacheError`] - cache store operations (open, lookup, write, delete)
//! - [`FetchError`] - network transport and response construction
//! - [`InstallError`] - seeding the app shell during install

use thiserror::Error;

/// Cache store errors. Each variant carries the platform's message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("failed to open cache '{name}': {message}")]
    Open { name: String, message: String },
    #[error("cache lookup failed: {0}")]
    Lookup(String),
    #[error("cache write failed: {0}")]
    Write(String),
    #[error("failed to list caches: {0}")]
    Keys(String),
    #[error("failed to delete cache '{name}': {message}")]
    Delete { name: String, message: String },
    /// Response body was already consumed and cannot be duplicated.
    #[error("failed to clone response: {0}")]
    Clone(String),
}

/// Network/fetch-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("invalid request for '{url}': {message}")]
    InvalidRequest { url: String, message: String },
    /// No response was obtainable (offline, DNS, CORS rejection, ...).
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP error: {0}")]
    BadStatus(u16),
    #[error("failed to build response: {0}")]
    ResponseBuild(String),
}

/// Install failures. Any of these leaves the new store without a seed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    #[error(transparent)]
    Open(CacheError),
    #[error("failed to fetch seed '{url}': {source}")]
    Seed { url: String, source: FetchError },
    #[error(transparent)]
    Write(CacheError),
}

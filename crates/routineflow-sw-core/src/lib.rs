//! Versioned offline cache for the routineflow service worker.
//!
//! This crate holds everything that does not depend on the browser:
//! - [`CacheLifecycle`] - install, activate and fetch handling
//! - [`CacheStorage`], [`Cache`], [`Transport`], [`Host`] - seams to the platform
//! - [`HttpRequest`], [`HttpResponse`] - the minimal view of an exchange
//! - [`CacheConfig`] and the deploy-time constants in [`config`]
//!
//! The `mock` feature adds in-memory implementations of every seam.

pub mod config;
pub mod console;
pub mod error;
mod host;
mod http;
mod lifecycle;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod storage;

pub use config::CacheConfig;
pub use error::{CacheError, FetchError, InstallError};
pub use host::{Host, Transport};
pub use http::{HttpRequest, HttpResponse, Request, Response, ResponseKind};
pub use lifecycle::{CacheLifecycle, FetchResponse, RequestOf, ResponseOf, ResponseSource};
pub use storage::{Cache, CacheStorage};

//! Seams to the environment hosting the worker.

use futures::future::LocalBoxFuture;

use crate::error::FetchError;

/// Network transport.
#[allow(async_fn_in_trait)]
pub trait Transport {
    type Request;
    type Response;

    /// Issue `request` over the network.
    ///
    /// HTTP error statuses are successful fetches; `Err` means no response
    /// was obtainable at all.
    async fn fetch(&self, request: &Self::Request) -> Result<Self::Response, FetchError>;
}

/// Lifecycle signals and background scheduling provided by the host.
pub trait Host {
    /// Skip the waiting phase and move straight toward activation.
    fn skip_waiting(&self);

    /// Take control of all open clients without waiting for a reload.
    fn claim_clients(&self);

    /// Run `task` to completion in the background. Never awaited by callers.
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

use async_trait::async_trait;
use axum::Router;
use tokio_util::sync::CancellationToken;

use crate::settings::Settings;

/// What a module sees while it is brought up.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
    /// Process-wide shutdown signal; background tasks must stop when it fires
    pub shutdown: &'a CancellationToken,
}

/// A unit of the service with its own routes, docs, and lifecycle.
///
/// The registry calls `init` then `start` on every module in registration
/// order, and `stop` in reverse order once the shutdown signal has fired.
#[async_trait]
pub trait Module: Sync + Send {
    /// Also the mount point: routes are served under `/api/{name}`.
    fn name(&self) -> &'static str;

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment with `paths` relative to the mount point and
    /// `components.schemas` merged as is.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Spawn background work; it must watch `ctx.shutdown`.
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Wait for background work and persist state.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// What a module sees while booting.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

/// A slice of the API (books, users, ...) with its own routes, docs, and
/// lifecycle hooks.
#[async_trait]
pub trait Module: Sync + Send {
    /// Also the mount point: routes land under `/api/{name}`.
    fn name(&self) -> &'static str;

    /// Runs once, in registration order, before anything is served.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Paths are relative to the module's mount point. Handlers must
    /// already have their state attached.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI `paths` and `components` for this module, with paths written
    /// relative to the mount point.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs in reverse registration order once the server has drained.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

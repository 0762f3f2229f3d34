//! Bookshop application library
//!
//! Wires the catalog store into the `books` and `users` modules and runs the
//! HTTP server around them.

pub mod modules;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bookshop_db::{CatalogStore, StoreConfig};
use bookshop_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Re-export commonly used types
pub use modules::*;

/// Store crypto parameters taken from the auth settings
pub fn store_config(settings: &Settings) -> StoreConfig {
    StoreConfig {
        bcrypt_cost: settings.auth.bcrypt_cost,
        jwt_secret: settings.auth.jwt_secret.clone(),
        token_ttl: Duration::from_secs(settings.auth.token_ttl_hours.saturating_mul(60 * 60)),
    }
}

/// Fresh seeded catalog plus every module registered against it
pub fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let catalog = Arc::new(
        CatalogStore::seeded(&store_config(settings)).context("failed to seed catalog")?,
    );

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &catalog)?;
    Ok(registry)
}

/// Run the full lifecycle: init, start, serve, stop
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry(&settings)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = bookshop_http::start_server(&registry, &settings).await;

    // Stop modules even when the server failed, then report the first error
    let stopped = registry.stop_modules().await;
    served?;
    stopped?;

    tracing::info!("bookshop shutdown complete");
    Ok(())
}

mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use bookshop_db::CatalogStore;
use bookshop_kernel::{InitCtx, Module};
use serde_json::json;

use crate::utils;

/// Catalog-wide review feed. Per-book reviews live in the books module.
pub struct ReviewsModule {
    catalog: Arc<CatalogStore>,
}

impl ReviewsModule {
    pub const fn new(catalog: Arc<CatalogStore>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Module for ReviewsModule {
    fn name(&self) -> &'static str {
        "reviews"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            reviews = self.catalog.list_all_reviews().len(),
            "reviews module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(routes::list_all_reviews))
            .with_state(self.catalog.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        // ReviewListResponse is contributed by the books module.
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List every review in the catalog",
                        "tags": ["Reviews"],
                        "responses": {
                            "200": {
                                "description": "All reviews, oldest first",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ReviewListResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(prefix = %utils::log_prefix(self.name()), "reviews module started");
        Ok(())
    }
}

pub fn create_module(catalog: Arc<CatalogStore>) -> Arc<dyn Module> {
    Arc::new(ReviewsModule::new(catalog))
}

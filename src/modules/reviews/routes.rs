use std::sync::Arc;

use axum::extract::State;
use bookshop_db::{CatalogStore, Review};
use bookshop_http::ApiResponse;

pub(crate) async fn list_all_reviews(
    State(store): State<Arc<CatalogStore>>,
) -> ApiResponse<Vec<Review>> {
    ApiResponse::ok("All reviews retrieved successfully", store.list_all_reviews())
}

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use bookshop_authz::Claims;
use bookshop_db::{CatalogStore, Credentials, UserProfile};
use bookshop_http::{ApiResponse, ApiResult, AuthUser};

use super::models::{LoginRequest, RegisterRequest};
use crate::utils::json_body;

type Store = State<Arc<CatalogStore>>;

pub(crate) async fn list_users(State(store): Store) -> ApiResponse<Vec<UserProfile>> {
    ApiResponse::ok("Users retrieved successfully", store.list_users())
}

pub(crate) async fn register(
    State(store): Store,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<UserProfile> {
    let request = json_body(payload)?;
    let user = store
        .register_user(&request.username, &request.email, &request.password)
        .await?;
    Ok(ApiResponse::created("User registered successfully", user))
}

pub(crate) async fn login(
    State(store): Store,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Credentials> {
    let request = json_body(payload)?;
    let credentials = store
        .authenticate(&request.username, &request.password)
        .await?;
    Ok(ApiResponse::ok("Login successful", credentials))
}

pub(crate) async fn me(AuthUser(claims): AuthUser) -> ApiResponse<Claims> {
    ApiResponse::ok("Token is valid", claims)
}

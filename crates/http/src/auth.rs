//! Bearer token guard for owner-checked routes.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use bookshop_authz::Claims;
use bookshop_db::CatalogStore;

use crate::error::AppError;

/// The verified caller. Handlers take owner identity from here, never from
/// the request body.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<CatalogStore>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::unauthorized("Access token required"))?;

        let store = Arc::<CatalogStore>::from_ref(state);
        let claims = store.tokens().verify(token).map_err(|err| {
            tracing::debug!(error = %err, "bearer token rejected");
            AppError::forbidden("Invalid token")
        })?;

        Ok(AuthUser(claims))
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

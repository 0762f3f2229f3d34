use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use bookshop_db::{Book, CatalogStore, Review};
use bookshop_http::{ApiResponse, ApiResult, AppError, AuthUser};

use super::models::ReviewRequest;
use crate::utils::{json_body, parse_id};

type Store = State<Arc<CatalogStore>>;

pub(crate) async fn list_books(State(store): Store) -> ApiResponse<Vec<Book>> {
    ApiResponse::ok("Book list retrieved successfully", store.list_books())
}

pub(crate) async fn get_book(State(store): Store, Path(id): Path<String>) -> ApiResult<Book> {
    let id = parse_id(&id, "book")?;
    Ok(ApiResponse::ok("Book found successfully", store.find_book(id)?))
}

pub(crate) async fn book_by_isbn(State(store): Store, Path(isbn): Path<String>) -> ApiResult<Book> {
    let book = store.find_book_by_isbn(&isbn)?;
    Ok(ApiResponse::ok("Book found successfully", book))
}

pub(crate) async fn books_by_author(
    State(store): Store,
    Path(author): Path<String>,
) -> ApiResult<Vec<Book>> {
    let books = store.find_books_by_author(&author)?;
    Ok(ApiResponse::ok("Books found successfully", books))
}

pub(crate) async fn books_by_title(
    State(store): Store,
    Path(title): Path<String>,
) -> ApiResult<Vec<Book>> {
    let books = store.find_books_by_title(&title)?;
    Ok(ApiResponse::ok("Books found successfully", books))
}

pub(crate) async fn list_reviews(
    State(store): Store,
    Path(book_id): Path<String>,
) -> ApiResult<Vec<Review>> {
    let book_id = parse_id(&book_id, "book")?;
    Ok(ApiResponse::ok(
        "Book reviews retrieved successfully",
        store.list_reviews(book_id),
    ))
}

pub(crate) async fn upsert_review(
    State(store): Store,
    Path(book_id): Path<String>,
    AuthUser(claims): AuthUser,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> ApiResult<Review> {
    let book_id = parse_id(&book_id, "book")?;
    let request = json_body(payload)?;
    let (Some(rating), Some(comment)) = (request.rating, request.comment) else {
        return Err(AppError::bad_request("Rating and comment are required"));
    };

    let outcome = store.upsert_review(book_id, claims.user_id, rating, &comment)?;
    if outcome.is_created() {
        Ok(ApiResponse::created("Review added successfully", outcome.into_review()))
    } else {
        Ok(ApiResponse::ok("Review updated successfully", outcome.into_review()))
    }
}

pub(crate) async fn delete_review(
    State(store): Store,
    Path(book_id): Path<String>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Review> {
    let book_id = parse_id(&book_id, "book")?;
    let removed = store.delete_review(book_id, claims.user_id)?;
    Ok(ApiResponse::ok("Review deleted successfully", removed))
}

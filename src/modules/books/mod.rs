pub mod models;
mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use bookshop_db::CatalogStore;
use bookshop_kernel::{InitCtx, Module};
use serde_json::json;

use crate::utils;

/// Catalog browsing plus per-book reviews
pub struct BooksModule {
    catalog: Arc<CatalogStore>,
}

impl BooksModule {
    pub const fn new(catalog: Arc<CatalogStore>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            books = self.catalog.list_books().len(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(routes::list_books))
            .route("/{id}", get(routes::get_book))
            .route("/isbn/{isbn}", get(routes::book_by_isbn))
            .route("/author/{author}", get(routes::books_by_author))
            .route("/title/{title}", get(routes::books_by_title))
            .route(
                "/{id}/reviews",
                get(routes::list_reviews)
                    .post(routes::upsert_review)
                    .delete(routes::delete_review),
            )
            .with_state(self.catalog.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let not_found = json!({
            "description": "Not found",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let bad_request = json!({
            "description": "Invalid input",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let unauthorized = json!({
            "description": "Missing bearer token",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let forbidden = json!({
            "description": "Bearer token rejected",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let book_list = json!({
            "description": "Matching books",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/BookListResponse" }
                }
            }
        });
        let book = json!({
            "description": "The book",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/BookResponse" }
                }
            }
        });
        let review = json!({
            "description": "The review",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ReviewResponse" }
                }
            }
        });
        let path_param = |name: &str, kind: &str| {
            json!({
                "name": name,
                "in": "path",
                "required": true,
                "schema": { "type": kind }
            })
        };

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": { "200": book_list }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book by id",
                        "tags": ["Books"],
                        "parameters": [path_param("id", "integer")],
                        "responses": { "200": book, "400": bad_request, "404": not_found }
                    }
                },
                "/isbn/{isbn}": {
                    "get": {
                        "summary": "Get a book by ISBN",
                        "tags": ["Books"],
                        "parameters": [path_param("isbn", "string")],
                        "responses": { "200": book, "404": not_found }
                    }
                },
                "/author/{author}": {
                    "get": {
                        "summary": "Books whose author contains the text, ignoring case",
                        "tags": ["Books"],
                        "parameters": [path_param("author", "string")],
                        "responses": { "200": book_list, "404": not_found }
                    }
                },
                "/title/{title}": {
                    "get": {
                        "summary": "Books whose title contains the text, ignoring case",
                        "tags": ["Books"],
                        "parameters": [path_param("title", "string")],
                        "responses": { "200": book_list, "404": not_found }
                    }
                },
                "/{id}/reviews": {
                    "get": {
                        "summary": "List reviews of a book",
                        "tags": ["Reviews"],
                        "parameters": [path_param("id", "integer")],
                        "responses": {
                            "200": {
                                "description": "Reviews, possibly empty",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ReviewListResponse" }
                                    }
                                }
                            },
                            "400": bad_request
                        }
                    },
                    "post": {
                        "summary": "Add or replace the caller's review of a book",
                        "tags": ["Reviews"],
                        "security": [{ "bearerAuth": [] }],
                        "parameters": [path_param("id", "integer")],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/ReviewRequest" }
                                }
                            }
                        },
                        "responses": {
                            "200": review,
                            "201": review,
                            "400": bad_request,
                            "401": unauthorized,
                            "403": forbidden,
                            "404": not_found
                        }
                    },
                    "delete": {
                        "summary": "Delete the caller's review of a book",
                        "tags": ["Reviews"],
                        "security": [{ "bearerAuth": [] }],
                        "parameters": [path_param("id", "integer")],
                        "responses": {
                            "200": review,
                            "401": unauthorized,
                            "403": forbidden,
                            "404": not_found
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "isbn": { "type": "string" },
                            "price": { "type": "number" },
                            "description": { "type": "string" }
                        },
                        "required": ["id", "title", "author", "isbn", "price", "description"]
                    },
                    "Review": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "bookId": { "type": "integer" },
                            "userId": { "type": "integer" },
                            "rating": { "type": "integer", "minimum": 1, "maximum": 5 },
                            "comment": { "type": "string" },
                            "createdAt": { "type": "string", "format": "date-time" },
                            "updatedAt": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "bookId", "userId", "rating", "comment", "createdAt"]
                    },
                    "ReviewRequest": {
                        "type": "object",
                        "properties": {
                            "rating": { "type": "integer", "minimum": 1, "maximum": 5 },
                            "comment": { "type": "string" }
                        },
                        "required": ["rating", "comment"]
                    },
                    "BookResponse": envelope_schema(json!({ "$ref": "#/components/schemas/Book" })),
                    "BookListResponse": envelope_schema(json!({
                        "type": "array",
                        "items": { "$ref": "#/components/schemas/Book" }
                    })),
                    "ReviewResponse": envelope_schema(json!({ "$ref": "#/components/schemas/Review" })),
                    "ReviewListResponse": envelope_schema(json!({
                        "type": "array",
                        "items": { "$ref": "#/components/schemas/Review" }
                    }))
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(prefix = %utils::log_prefix(self.name()), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(prefix = %utils::log_prefix(self.name()), "books module stopped");
        Ok(())
    }
}

/// `{ success, message, data }` wrapping the given payload schema
pub(crate) fn envelope_schema(data: serde_json::Value) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "success": { "type": "boolean" },
            "message": { "type": "string" },
            "data": data
        },
        "required": ["success", "message", "data"]
    })
}

/// Create a new instance of the books module
pub fn create_module(catalog: Arc<CatalogStore>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(catalog))
}

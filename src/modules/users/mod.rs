pub mod models;
mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    routing::{get, post},
    Router,
};
use bookshop_db::CatalogStore;
use bookshop_kernel::{InitCtx, Module};
use serde_json::json;

use super::books::envelope_schema;
use crate::utils;

/// Registration, login, and token introspection
pub struct UsersModule {
    catalog: Arc<CatalogStore>,
}

impl UsersModule {
    pub const fn new(catalog: Arc<CatalogStore>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Module for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            users = self.catalog.list_users().len(),
            token_ttl_hours = ctx.settings.auth.token_ttl_hours,
            "users module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(routes::list_users))
            .route("/register", post(routes::register))
            .route("/login", post(routes::login))
            .route("/me", get(routes::me))
            .with_state(self.catalog.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let body = |schema: &str| {
            json!({
                "required": true,
                "content": {
                    "application/json": {
                        "schema": { "$ref": format!("#/components/schemas/{schema}") }
                    }
                }
            })
        };
        let ok = |description: &str, schema: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": format!("#/components/schemas/{schema}") }
                    }
                }
            })
        };

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List users",
                        "tags": ["Users"],
                        "responses": { "200": ok("Users without password hashes", "UserListResponse") }
                    }
                },
                "/register": {
                    "post": {
                        "summary": "Register a new user",
                        "tags": ["Users"],
                        "requestBody": body("RegisterRequest"),
                        "responses": {
                            "201": ok("Created user", "UserResponse"),
                            "400": error("Invalid input, or username/email already taken")
                        }
                    }
                },
                "/login": {
                    "post": {
                        "summary": "Exchange username (or email) and password for a bearer token",
                        "tags": ["Users"],
                        "requestBody": body("LoginRequest"),
                        "responses": {
                            "200": ok("Signed token valid for the configured ttl", "CredentialsResponse"),
                            "400": error("Missing username or password"),
                            "401": error("Invalid credentials")
                        }
                    }
                },
                "/me": {
                    "get": {
                        "summary": "Show the identity asserted by the bearer token",
                        "tags": ["Users"],
                        "security": [{ "bearerAuth": [] }],
                        "responses": {
                            "200": ok("Token claims", "ClaimsResponse"),
                            "401": error("Missing bearer token"),
                            "403": error("Bearer token rejected")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "User": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "username": { "type": "string" },
                            "email": { "type": "string", "format": "email" },
                            "createdAt": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "username", "email", "createdAt"]
                    },
                    "RegisterRequest": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string" },
                            "email": { "type": "string", "format": "email" },
                            "password": { "type": "string", "minLength": 6 }
                        },
                        "required": ["username", "email", "password"]
                    },
                    "LoginRequest": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string", "description": "Username or email" },
                            "password": { "type": "string" }
                        },
                        "required": ["username", "password"]
                    },
                    "Credentials": {
                        "type": "object",
                        "properties": {
                            "token": { "type": "string" },
                            "tokenType": { "type": "string" },
                            "expiresIn": { "type": "integer", "description": "Seconds" },
                            "user": { "$ref": "#/components/schemas/User" }
                        },
                        "required": ["token", "tokenType", "expiresIn", "user"]
                    },
                    "Claims": {
                        "type": "object",
                        "properties": {
                            "userId": { "type": "integer" },
                            "username": { "type": "string" },
                            "email": { "type": "string" },
                            "iat": { "type": "integer" },
                            "exp": { "type": "integer" }
                        },
                        "required": ["userId", "username", "email", "iat", "exp"]
                    },
                    "UserResponse": envelope_schema(json!({ "$ref": "#/components/schemas/User" })),
                    "UserListResponse": envelope_schema(json!({
                        "type": "array",
                        "items": { "$ref": "#/components/schemas/User" }
                    })),
                    "CredentialsResponse": envelope_schema(json!({ "$ref": "#/components/schemas/Credentials" })),
                    "ClaimsResponse": envelope_schema(json!({ "$ref": "#/components/schemas/Claims" }))
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(prefix = %utils::log_prefix(self.name()), "users module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(prefix = %utils::log_prefix(self.name()), "users module stopped");
        Ok(())
    }
}

/// Create a new instance of the users module
pub fn create_module(catalog: Arc<CatalogStore>) -> Arc<dyn Module> {
    Arc::new(UsersModule::new(catalog))
}

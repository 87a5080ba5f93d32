pub mod handlers;
pub mod models;

use async_trait::async_trait;
use axum::{
    routing::{get, post},
    Router,
};
use serde_json::json;
use shelf_kernel::{AppState, InitCtx, Migration, Module};

use crate::utils::{error_response, json_body, json_response};

/// Account registration and session login
pub struct AuthModule;

impl AuthModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let (accounts,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(ctx.db)
            .await?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            accounts,
            "auth module initialized"
        );
        Ok(())
    }

    fn routes(&self, state: AppState) -> Router {
        Router::new()
            .route("/register", post(handlers::register))
            .route("/login", post(handlers::login))
            .route("/auth/health", get(health_check))
            .with_state(state)
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/register": {
                    "post": {
                        "summary": "Register an account",
                        "tags": ["Auth"],
                        "requestBody": json_body("RegisterRequest"),
                        "responses": {
                            "201": json_response("Account created", json!({ "$ref": "#/components/schemas/Message" })),
                            "400": error_response("A required field is missing"),
                            "409": error_response("Email already registered")
                        }
                    }
                },
                "/login": {
                    "post": {
                        "summary": "Log in and receive a session cookie",
                        "tags": ["Auth"],
                        "requestBody": json_body("LoginRequest"),
                        "responses": {
                            "200": json_response("Session issued; also set as the `token` cookie", json!({ "$ref": "#/components/schemas/LoginResponse" })),
                            "400": error_response("Missing field or unknown role"),
                            "401": error_response("Invalid credentials"),
                            "404": error_response("No account with this email and role")
                        }
                    }
                },
                "/auth/health": {
                    "get": {
                        "summary": "Auth health check",
                        "tags": ["Auth"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": { "text/plain": { "schema": { "type": "string" } } }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Role": { "type": "string", "enum": ["user", "admin"] },
                    "Message": {
                        "type": "object",
                        "properties": { "message": { "type": "string" } },
                        "required": ["message"]
                    },
                    "RegisterRequest": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "email": { "type": "string", "format": "email" },
                            "password": { "type": "string", "format": "password" },
                            "role": { "$ref": "#/components/schemas/Role" }
                        },
                        "required": ["name", "email", "password", "role"]
                    },
                    "LoginRequest": {
                        "type": "object",
                        "properties": {
                            "email": { "type": "string", "format": "email" },
                            "password": { "type": "string", "format": "password" },
                            "role": { "$ref": "#/components/schemas/Role" }
                        },
                        "required": ["email", "password", "role"]
                    },
                    "User": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "name": { "type": "string" },
                            "email": { "type": "string", "format": "email" },
                            "role": { "$ref": "#/components/schemas/Role" }
                        },
                        "required": ["id", "name", "email", "role"]
                    },
                    "LoginResponse": {
                        "type": "object",
                        "properties": {
                            "message": { "type": "string" },
                            "token": { "type": "string" },
                            "user": { "$ref": "#/components/schemas/User" }
                        },
                        "required": ["message", "token", "user"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE users (
                    id       INTEGER PRIMARY KEY AUTOINCREMENT,
                    name     TEXT NOT NULL CHECK (name != ''),
                    email    TEXT NOT NULL UNIQUE COLLATE NOCASE,
                    password TEXT NOT NULL,
                    role     TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin'))
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "auth module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "auth module stopped");
        Ok(())
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "auth module is healthy"
}

/// Create a new instance of the auth module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(AuthModule::new())
}

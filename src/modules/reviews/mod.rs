pub mod handlers;
pub mod models;

use async_trait::async_trait;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use serde_json::json;
use shelf_kernel::{AppState, InitCtx, Migration, Module};

use crate::utils::{error_response, json_body, json_response};

/// Reviews written by signed-in users; only the author may change them
pub struct ReviewsModule;

impl ReviewsModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for ReviewsModule {
    fn name(&self) -> &'static str {
        "reviews"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "reviews module initialized"
        );
        Ok(())
    }

    fn routes(&self, state: AppState) -> Router {
        Router::new()
            .route("/addReview", post(handlers::add_review))
            .route("/editReview", patch(handlers::edit_review))
            .route("/deleteReview", delete(handlers::delete_review))
            .route("/reviews/health", get(health_check))
            .with_state(state)
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let message = json!({ "$ref": "#/components/schemas/Message" });

        Some(json!({
            "paths": {
                "/addReview": {
                    "post": {
                        "summary": "Review a book",
                        "tags": ["Reviews"],
                        "requestBody": json_body("CreateReview"),
                        "responses": {
                            "201": json_response("Review created", json!({
                                "type": "object",
                                "properties": {
                                    "message": { "type": "string" },
                                    "reviewId": { "type": "integer" }
                                }
                            })),
                            "400": error_response("Missing field or rating outside 1-5"),
                            "401": error_response("No session token"),
                            "403": error_response("Invalid or expired session"),
                            "404": error_response("Book not found")
                        }
                    }
                },
                "/editReview": {
                    "patch": {
                        "summary": "Change your own review",
                        "tags": ["Reviews"],
                        "requestBody": json_body("UpdateReview"),
                        "responses": {
                            "200": json_response("Review updated", message.clone()),
                            "400": error_response("Missing review_id or rating outside 1-5"),
                            "401": error_response("No session token"),
                            "403": error_response("Invalid session or not the review's author"),
                            "404": error_response("Review not found")
                        }
                    }
                },
                "/deleteReview": {
                    "delete": {
                        "summary": "Delete your own review",
                        "tags": ["Reviews"],
                        "requestBody": json_body("DeleteReview"),
                        "responses": {
                            "200": json_response("Review deleted", message),
                            "400": error_response("Missing review_id"),
                            "401": error_response("No session token"),
                            "403": error_response("Invalid session or not the review's author"),
                            "404": error_response("Review not found")
                        }
                    }
                },
                "/reviews/health": {
                    "get": {
                        "summary": "Reviews health check",
                        "tags": ["Reviews"],
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
                    "Review": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "user_id": { "type": "integer" },
                            "book_id": { "type": "integer" },
                            "rating": { "type": "integer", "minimum": 1, "maximum": 5 },
                            "comment": { "type": ["string", "null"] }
                        },
                        "required": ["id", "user_id", "book_id", "rating"]
                    },
                    "CreateReview": {
                        "type": "object",
                        "properties": {
                            "book_id": { "type": "integer" },
                            "rating": { "type": "integer", "minimum": 1, "maximum": 5 },
                            "comment": { "type": "string" }
                        },
                        "required": ["book_id", "rating"]
                    },
                    "UpdateReview": {
                        "type": "object",
                        "properties": {
                            "review_id": { "type": "integer" },
                            "rating": { "type": "integer", "minimum": 1, "maximum": 5 },
                            "comment": { "type": "string" }
                        },
                        "required": ["review_id"]
                    },
                    "DeleteReview": {
                        "type": "object",
                        "properties": { "review_id": { "type": "integer" } },
                        "required": ["review_id"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE reviews (
                    id      INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    book_id INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
                    rating  INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                    comment TEXT
                );
                CREATE INDEX reviews_book_id_idx ON reviews (book_id);
                CREATE INDEX reviews_user_id_idx ON reviews (user_id);
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "reviews module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "reviews module stopped");
        Ok(())
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "reviews module is healthy"
}

/// Create a new instance of the reviews module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(ReviewsModule::new())
}

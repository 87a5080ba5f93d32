pub mod aggregate;
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

/// Book catalogue: public read views and admin-only maintenance
pub struct BooksModule;

impl BooksModule {
    pub const fn new() -> Self {
        Self
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
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self, state: AppState) -> Router {
        Router::new()
            .route("/getBooksAndReviews", get(handlers::books_and_reviews))
            .route("/getBooksWithReviews", get(handlers::books_with_reviews))
            .route("/average-ratings", get(handlers::average_ratings))
            .route("/finalData", get(handlers::final_data))
            .route("/addBook", post(handlers::add_book))
            .route("/editBook", patch(handlers::edit_book))
            .route("/deleteBook", delete(handlers::delete_book))
            .route("/books/health", get(health_check))
            .with_state(state)
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let admin_errors = |ok: serde_json::Value| {
            json!({
                "200": ok,
                "400": error_response("A required field is missing"),
                "401": error_response("No session token"),
                "403": error_response("Invalid session or not an admin"),
                "404": error_response("Book not found")
            })
        };

        Some(json!({
            "paths": {
                "/getBooksAndReviews": {
                    "get": {
                        "summary": "All books and all reviews, unjoined",
                        "tags": ["Books"],
                        "responses": {
                            "200": json_response("Books and reviews", json!({
                                "type": "object",
                                "properties": {
                                    "books": { "type": "array", "items": { "$ref": "#/components/schemas/Book" } },
                                    "reviews": { "type": "array", "items": { "$ref": "#/components/schemas/Review" } }
                                }
                            })),
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/getBooksWithReviews": {
                    "get": {
                        "summary": "Books left-joined with reviews, one row per pair",
                        "tags": ["Books"],
                        "responses": {
                            "200": json_response("Joined rows", json!({
                                "type": "object",
                                "properties": {
                                    "data": { "type": "array", "items": { "$ref": "#/components/schemas/JoinedRow" } }
                                }
                            })),
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/average-ratings": {
                    "get": {
                        "summary": "Average rating and review count per book",
                        "tags": ["Books"],
                        "responses": {
                            "200": json_response("Rating summaries", json!({
                                "type": "object",
                                "properties": {
                                    "success": { "type": "boolean" },
                                    "data": { "type": "array", "items": { "$ref": "#/components/schemas/RatingSummary" } }
                                }
                            })),
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/finalData": {
                    "get": {
                        "summary": "Every book with its reviews nested",
                        "tags": ["Books"],
                        "responses": {
                            "200": json_response("Nested books", json!({
                                "type": "object",
                                "properties": {
                                    "books": { "type": "array", "items": { "$ref": "#/components/schemas/BookWithReviews" } }
                                }
                            })),
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/addBook": {
                    "post": {
                        "summary": "Add a book (admin)",
                        "tags": ["Books"],
                        "requestBody": json_body("CreateBook"),
                        "responses": {
                            "201": json_response("Book created", json!({
                                "type": "object",
                                "properties": {
                                    "message": { "type": "string" },
                                    "bookId": { "type": "integer" }
                                }
                            })),
                            "400": error_response("Title, author, and year are required"),
                            "401": error_response("No session token"),
                            "403": error_response("Invalid session or not an admin")
                        }
                    }
                },
                "/editBook": {
                    "patch": {
                        "summary": "Update some fields of a book (admin)",
                        "tags": ["Books"],
                        "requestBody": json_body("UpdateBook"),
                        "responses": admin_errors(json_response("Book updated", json!({ "$ref": "#/components/schemas/Message" })))
                    }
                },
                "/deleteBook": {
                    "delete": {
                        "summary": "Delete a book and its reviews (admin)",
                        "tags": ["Books"],
                        "requestBody": json_body("DeleteBook"),
                        "responses": admin_errors(json_response("Book deleted", json!({ "$ref": "#/components/schemas/Message" })))
                    }
                },
                "/books/health": {
                    "get": {
                        "summary": "Books health check",
                        "tags": ["Books"],
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
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "year": { "type": "integer" },
                            "availability": { "type": "boolean" }
                        },
                        "required": ["id", "title", "author", "year", "availability"]
                    },
                    "JoinedRow": {
                        "type": "object",
                        "properties": {
                            "book_id": { "type": "integer" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "year": { "type": "integer" },
                            "availability": { "type": "boolean" },
                            "review_id": { "type": ["integer", "null"] },
                            "user_id": { "type": ["integer", "null"] },
                            "rating": { "type": ["integer", "null"] },
                            "comment": { "type": ["string", "null"] }
                        }
                    },
                    "ReviewEntry": {
                        "type": "object",
                        "properties": {
                            "review_id": { "type": "integer" },
                            "user_id": { "type": "integer" },
                            "rating": { "type": "integer", "minimum": 1, "maximum": 5 },
                            "comment": { "type": ["string", "null"] }
                        }
                    },
                    "BookWithReviews": {
                        "type": "object",
                        "properties": {
                            "book_id": { "type": "integer" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "year": { "type": "integer" },
                            "availability": { "type": "boolean" },
                            "reviews": { "type": "array", "items": { "$ref": "#/components/schemas/ReviewEntry" } }
                        }
                    },
                    "RatingSummary": {
                        "type": "object",
                        "properties": {
                            "book_id": { "type": "integer" },
                            "average_rating": { "type": "number" },
                            "total_reviews": { "type": "integer" }
                        }
                    },
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "year": { "type": "integer" },
                            "availability": { "type": "boolean", "default": true }
                        },
                        "required": ["title", "author", "year"]
                    },
                    "UpdateBook": {
                        "type": "object",
                        "properties": {
                            "book_id": { "type": "integer" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "year": { "type": "integer" },
                            "availability": { "type": "boolean" }
                        },
                        "required": ["book_id"]
                    },
                    "DeleteBook": {
                        "type": "object",
                        "properties": { "bookId": { "type": "integer" } },
                        "required": ["bookId"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE books (
                    id           INTEGER PRIMARY KEY AUTOINCREMENT,
                    title        TEXT NOT NULL CHECK (title != ''),
                    author       TEXT NOT NULL CHECK (author != ''),
                    year         INTEGER NOT NULL,
                    availability BOOLEAN NOT NULL DEFAULT 1
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new())
}

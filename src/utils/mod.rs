//! Request validation and OpenAPI helpers shared by the feature modules.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shelf_http::AppError;

pub const RATING_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

/// Blank or whitespace-only strings count as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Names of the fields whose presence flag is false.
pub fn missing(fields: &[(&'static str, bool)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect()
}

/// Body of every plain success response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Reject ratings outside 1..=5.
pub fn check_rating(rating: i64) -> Result<i64, AppError> {
    if RATING_RANGE.contains(&rating) {
        Ok(rating)
    } else {
        Err(AppError::validation(
            vec![json!({ "field": "rating", "error": "out_of_range", "value": rating })],
            "Rating must be between 1 and 5",
        ))
    }
}

/// OpenAPI response object pointing at the shared error schema.
pub fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

/// OpenAPI response object with a JSON body of the given schema.
pub fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

/// OpenAPI request body referencing a component schema.
pub fn json_body(schema: &str) -> Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{}", schema) }
            }
        }
    })
}

use serde::{Deserialize, Serialize};

/// A row of the `books` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub year: i64,
    pub availability: bool,
}

/// One row of `books LEFT JOIN reviews`: a book plus at most one of its
/// reviews. Review columns are all null for a book without reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct JoinedRow {
    pub book_id: i64,
    pub title: String,
    pub author: String,
    pub year: i64,
    pub availability: bool,
    pub review_id: Option<i64>,
    pub user_id: Option<i64>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

/// Per-book rating statistics over all its reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RatingSummary {
    pub book_id: i64,
    pub average_rating: f64,
    pub total_reviews: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i64>,
    pub availability: Option<bool>,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBook {
    pub book_id: Option<i64>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i64>,
    pub availability: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteBook {
    #[serde(rename = "bookId", alias = "book_id")]
    pub book_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookCreated {
    pub message: String,
    #[serde(rename = "bookId")]
    pub book_id: i64,
}

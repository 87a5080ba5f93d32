use serde::{Deserialize, Serialize};

/// A row of the `reviews` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateReview {
    pub book_id: Option<i64>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReview {
    pub review_id: Option<i64>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteReview {
    pub review_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCreated {
    pub message: String,
    #[serde(rename = "reviewId")]
    pub review_id: i64,
}

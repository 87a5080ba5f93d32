use axum::{extract::State, http::StatusCode, Json};
use shelf_authz::{ensure_owner, Authenticated, Authorized};
use shelf_http::{AppError, JsonBody};
use shelf_kernel::AppState;
use sqlx::SqlitePool;

use super::models::{CreateReview, DeleteReview, ReviewCreated, UpdateReview};
use crate::utils::{check_rating, missing, non_blank, MessageResponse};

/// Owner of review `review_id`, or 404 when there is no such review.
async fn review_owner(db: &SqlitePool, review_id: i64) -> Result<i64, AppError> {
    let owner: Option<(i64,)> = sqlx::query_as("SELECT user_id FROM reviews WHERE id = ?")
        .bind(review_id)
        .fetch_optional(db)
        .await?;
    owner
        .map(|(user_id,)| user_id)
        .ok_or_else(|| AppError::not_found("Review not found"))
}

/// POST /addReview
pub async fn add_review(
    State(state): State<AppState>,
    Authorized(session, _): Authorized<Authenticated>,
    JsonBody(body): JsonBody<CreateReview>,
) -> Result<(StatusCode, Json<ReviewCreated>), AppError> {
    let absent = missing(&[
        ("book_id", body.book_id.is_some()),
        ("rating", body.rating.is_some()),
    ]);
    let (Some(book_id), Some(rating)) = (body.book_id, body.rating) else {
        return Err(AppError::missing_fields(
            &absent,
            "Book ID and rating are required",
        ));
    };
    let rating = check_rating(rating)?;

    let book: Option<(i64,)> = sqlx::query_as("SELECT id FROM books WHERE id = ?")
        .bind(book_id)
        .fetch_optional(&state.db)
        .await?;
    if book.is_none() {
        return Err(AppError::not_found("Book not found"));
    }

    let inserted =
        sqlx::query("INSERT INTO reviews (user_id, book_id, rating, comment) VALUES (?, ?, ?, ?)")
            .bind(session.user_id)
            .bind(book_id)
            .bind(rating)
            .bind(non_blank(body.comment))
            .execute(&state.db)
            .await;

    // The book or the account may vanish between the check and the insert.
    let review_id = match inserted {
        Ok(result) => result.last_insert_rowid(),
        Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
            return Err(AppError::not_found("Book or account no longer exists"));
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(review_id, book_id, user_id = session.user_id, "review added");
    Ok((
        StatusCode::CREATED,
        Json(ReviewCreated {
            message: "Review added successfully".to_string(),
            review_id,
        }),
    ))
}

/// PATCH /editReview (owner only)
pub async fn edit_review(
    State(state): State<AppState>,
    Authorized(session, _): Authorized<Authenticated>,
    JsonBody(body): JsonBody<UpdateReview>,
) -> Result<Json<MessageResponse>, AppError> {
    let Some(review_id) = body.review_id else {
        return Err(AppError::missing_fields(&["review_id"], "Review ID is required"));
    };
    let rating = body.rating.map(check_rating).transpose()?;

    let owner = review_owner(&state.db, review_id).await?;
    ensure_owner(&session, owner, "You are not allowed to edit this review")?;

    sqlx::query(
        r#"
        UPDATE reviews
        SET rating = COALESCE(?, rating),
            comment = COALESCE(?, comment)
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(rating)
    .bind(non_blank(body.comment))
    .bind(review_id)
    .bind(session.user_id)
    .execute(&state.db)
    .await?;

    tracing::info!(review_id, user_id = session.user_id, "review updated");
    Ok(Json(MessageResponse::new("Review updated successfully")))
}

/// DELETE /deleteReview (owner only)
pub async fn delete_review(
    State(state): State<AppState>,
    Authorized(session, _): Authorized<Authenticated>,
    JsonBody(body): JsonBody<DeleteReview>,
) -> Result<Json<MessageResponse>, AppError> {
    let Some(review_id) = body.review_id else {
        return Err(AppError::missing_fields(&["review_id"], "Review ID is required"));
    };

    let owner = review_owner(&state.db, review_id).await?;
    ensure_owner(&session, owner, "You are not allowed to delete this review")?;

    sqlx::query("DELETE FROM reviews WHERE id = ? AND user_id = ?")
        .bind(review_id)
        .bind(session.user_id)
        .execute(&state.db)
        .await?;

    tracing::info!(review_id, user_id = session.user_id, "review deleted");
    Ok(Json(MessageResponse::new("Review deleted successfully")))
}

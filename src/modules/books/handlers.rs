use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use shelf_authz::{AdminOnly, Authorized};
use shelf_http::{AppError, JsonBody};
use shelf_kernel::AppState;

use super::aggregate::group_reviews;
use super::models::{
    Book, BookCreated, CreateBook, DeleteBook, JoinedRow, RatingSummary, UpdateBook,
};
use crate::modules::reviews::models::Review;
use crate::utils::{missing, non_blank, MessageResponse};

const JOINED_ROWS: &str = r#"
    SELECT
        books.id AS book_id,
        books.title,
        books.author,
        books.year,
        books.availability,
        reviews.id AS review_id,
        reviews.user_id,
        reviews.rating,
        reviews.comment
    FROM books
    LEFT JOIN reviews ON books.id = reviews.book_id
    ORDER BY books.id, reviews.id
"#;

/// GET /getBooksAndReviews: both tables, unjoined.
pub async fn books_and_reviews(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let books: Vec<Book> =
        sqlx::query_as("SELECT id, title, author, year, availability FROM books ORDER BY id")
            .fetch_all(&state.db)
            .await?;
    let reviews: Vec<Review> = sqlx::query_as(
        "SELECT id, user_id, book_id, rating, comment FROM reviews ORDER BY id",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(json!({ "books": books, "reviews": reviews })))
}

/// GET /getBooksWithReviews: the flat join, one row per (book, review).
pub async fn books_with_reviews(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let rows: Vec<JoinedRow> = sqlx::query_as(JOINED_ROWS).fetch_all(&state.db).await?;
    Ok(Json(json!({ "data": rows })))
}

/// GET /finalData: the join folded into one document per book.
pub async fn final_data(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let rows: Vec<JoinedRow> = sqlx::query_as(JOINED_ROWS).fetch_all(&state.db).await?;
    let books = group_reviews(rows);
    tracing::debug!(books = books.len(), "aggregated books with reviews");
    Ok(Json(json!({ "books": books })))
}

/// GET /average-ratings
pub async fn average_ratings(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let summaries: Vec<RatingSummary> = sqlx::query_as(
        r#"
        SELECT
            book_id,
            AVG(rating) AS average_rating,
            COUNT(*) AS total_reviews
        FROM reviews
        GROUP BY book_id
        ORDER BY book_id
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(json!({ "success": true, "data": summaries })))
}

/// POST /addBook
pub async fn add_book(
    State(state): State<AppState>,
    Authorized(session, _): Authorized<AdminOnly>,
    JsonBody(body): JsonBody<CreateBook>,
) -> Result<(StatusCode, Json<BookCreated>), AppError> {
    let title = non_blank(body.title);
    let author = non_blank(body.author);

    let absent = missing(&[
        ("title", title.is_some()),
        ("author", author.is_some()),
        ("year", body.year.is_some()),
    ]);
    let (Some(title), Some(author), Some(year)) = (title, author, body.year) else {
        return Err(AppError::missing_fields(
            &absent,
            "Title, author, and year are required",
        ));
    };
    let availability = body.availability.unwrap_or(true);

    let book_id =
        sqlx::query("INSERT INTO books (title, author, year, availability) VALUES (?, ?, ?, ?)")
            .bind(&title)
            .bind(&author)
            .bind(year)
            .bind(availability)
            .execute(&state.db)
            .await?
            .last_insert_rowid();

    tracing::info!(book_id, admin_id = session.user_id, "book added");
    Ok((
        StatusCode::CREATED,
        Json(BookCreated {
            message: "Book added successfully".to_string(),
            book_id,
        }),
    ))
}

/// PATCH /editBook
pub async fn edit_book(
    State(state): State<AppState>,
    Authorized(session, _): Authorized<AdminOnly>,
    JsonBody(body): JsonBody<UpdateBook>,
) -> Result<Json<MessageResponse>, AppError> {
    let Some(book_id) = body.book_id else {
        return Err(AppError::missing_fields(&["book_id"], "Book ID is required"));
    };

    let updated = sqlx::query(
        r#"
        UPDATE books
        SET title = COALESCE(?, title),
            author = COALESCE(?, author),
            year = COALESCE(?, year),
            availability = COALESCE(?, availability)
        WHERE id = ?
        "#,
    )
    .bind(non_blank(body.title))
    .bind(non_blank(body.author))
    .bind(body.year)
    .bind(body.availability)
    .bind(book_id)
    .execute(&state.db)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(AppError::not_found("Book not found"));
    }

    tracing::info!(book_id, admin_id = session.user_id, "book updated");
    Ok(Json(MessageResponse::new("Book updated successfully")))
}

/// DELETE /deleteBook; the book's reviews go with it.
pub async fn delete_book(
    State(state): State<AppState>,
    Authorized(session, _): Authorized<AdminOnly>,
    JsonBody(body): JsonBody<DeleteBook>,
) -> Result<Json<MessageResponse>, AppError> {
    let Some(book_id) = body.book_id else {
        return Err(AppError::missing_fields(&["bookId"], "Book ID is required"));
    };

    let deleted = sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(book_id)
        .execute(&state.db)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::not_found("Book not found"));
    }

    tracing::info!(book_id, admin_id = session.user_id, "book deleted");
    Ok(Json(MessageResponse::new("Book deleted successfully")))
}

//! Folding flat book/review join rows back into nested documents.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::models::JoinedRow;

/// A review as embedded under its book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub review_id: i64,
    pub user_id: Option<i64>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

/// A book together with all of its reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookWithReviews {
    pub book_id: i64,
    pub title: String,
    pub author: String,
    pub year: i64,
    pub availability: bool,
    pub reviews: Vec<ReviewEntry>,
}

/// Group joined rows by book.
///
/// Books come out once each, in the order they were first seen; rows for the
/// same book need not be adjacent. Reviews keep their input order. A row
/// whose `review_id` is null contributes the book only.
pub fn group_reviews<I>(rows: I) -> Vec<BookWithReviews>
where
    I: IntoIterator<Item = JoinedRow>,
{
    let mut slots: HashMap<i64, usize> = HashMap::new();
    let mut books: Vec<BookWithReviews> = Vec::new();

    for row in rows {
        let slot = match slots.get(&row.book_id) {
            Some(&slot) => slot,
            None => {
                books.push(BookWithReviews {
                    book_id: row.book_id,
                    title: row.title,
                    author: row.author,
                    year: row.year,
                    availability: row.availability,
                    reviews: Vec::new(),
                });
                slots.insert(row.book_id, books.len() - 1);
                books.len() - 1
            }
        };

        if let Some(review_id) = row.review_id {
            books[slot].reviews.push(ReviewEntry {
                review_id,
                user_id: row.user_id,
                rating: row.rating,
                comment: row.comment,
            });
        }
    }

    books
}

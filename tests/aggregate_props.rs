//! Property-based tests for grouping joined book/review rows

use std::collections::BTreeSet;

use proptest::prelude::*;
use shelf_app::books::{aggregate::group_reviews, models::JoinedRow};

/// (book id, optional review id) pairs; review ids are unique per input.
fn joined_rows() -> impl Strategy<Value = Vec<JoinedRow>> {
    prop::collection::vec((0i64..8, any::<bool>()), 0..40).prop_map(|pairs| {
        pairs
            .into_iter()
            .enumerate()
            .map(|(index, (book_id, reviewed))| JoinedRow {
                book_id,
                title: format!("Book {}", book_id),
                author: "Author".to_string(),
                year: 2000 + book_id,
                availability: book_id % 2 == 0,
                review_id: reviewed.then_some(index as i64 + 1),
                user_id: reviewed.then_some(index as i64 % 3 + 1),
                rating: reviewed.then_some(index as i64 % 5 + 1),
                comment: None,
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn one_entry_per_distinct_book(rows in joined_rows()) {
        let distinct: BTreeSet<i64> = rows.iter().map(|row| row.book_id).collect();
        let books = group_reviews(rows);

        prop_assert_eq!(books.len(), distinct.len());
        let seen: BTreeSet<i64> = books.iter().map(|book| book.book_id).collect();
        prop_assert_eq!(seen, distinct);
    }

    #[test]
    fn null_reviews_contribute_nothing(rows in joined_rows()) {
        let non_null = rows.iter().filter(|row| row.review_id.is_some()).count();
        let books = group_reviews(rows);

        let nested: usize = books.iter().map(|book| book.reviews.len()).sum();
        prop_assert_eq!(nested, non_null);
    }

    #[test]
    fn reviews_keep_input_order(rows in joined_rows()) {
        let books = group_reviews(rows.clone());

        for book in &books {
            let expected: Vec<i64> = rows
                .iter()
                .filter(|row| row.book_id == book.book_id)
                .filter_map(|row| row.review_id)
                .collect();
            let actual: Vec<i64> = book.reviews.iter().map(|review| review.review_id).collect();
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn books_appear_in_first_seen_order(rows in joined_rows()) {
        let mut first_seen = Vec::new();
        for row in &rows {
            if !first_seen.contains(&row.book_id) {
                first_seen.push(row.book_id);
            }
        }

        let order: Vec<i64> = group_reviews(rows).iter().map(|book| book.book_id).collect();
        prop_assert_eq!(order, first_seen);
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-authored rating plus comment attached to exactly one book.
/// `user_id` is immutable after creation; `updated_at` stays empty until
/// the owner edits the review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub rating: f64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Catalog entry with its review sequence in creation order.
/// `rating` is the aggregate rating field; `add_review` overwrites it with
/// the newest review's rating (documented source behavior).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub rating: f64,
    pub reviews: Vec<Review>,
}

/// Search parameters for the catalog: case-insensitive substring match on
/// author/title, plus an optional minimum aggregate rating.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookFilter {
    pub author: Option<String>,
    pub title: Option<String>,
    pub min_rating: Option<f64>,
}

impl From<models::review::Model> for Review {
    fn from(row: models::review::Model) -> Self {
        Review {
            id: row.id,
            user_id: row.user_id,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at.with_timezone(&Utc),
            updated_at: row.updated_at.map(|t| t.with_timezone(&Utc)),
        }
    }
}

impl Book {
    /// Assemble a domain book from its row and the review rows in stored order.
    pub fn from_rows(book: models::book::Model, reviews: Vec<models::review::Model>) -> Self {
        Book {
            id: book.id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            rating: book.rating,
            reviews: reviews.into_iter().map(Review::from).collect(),
        }
    }
}

use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{Book, BookFilter};
use crate::errors::ServiceError;
use crate::reviews::ops::ReviewMutation;

/// Repository abstraction over the book catalog: the single source of truth
/// for book records and their embedded review sequences.
///
/// `apply_review_mutation` must be atomic per book: the mutation observes a
/// consistent snapshot of the review sequence, and the change is durably
/// committed before the call returns. `Ok(None)` means the book id did not
/// resolve.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Book>, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Book>, ServiceError>;
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, ServiceError>;
    async fn search(&self, filter: &BookFilter) -> Result<Vec<Book>, ServiceError>;
    /// Books with aggregate rating >= `rating`, sorted descending by rating.
    async fn with_min_rating(&self, rating: f64) -> Result<Vec<Book>, ServiceError>;
    async fn apply_review_mutation(
        &self,
        book_id: Uuid,
        mutation: ReviewMutation,
    ) -> Result<Option<Book>, ServiceError>;
}

/// Simple in-memory store for tests and doc examples
pub mod mock {
    use super::*;
    use crate::reviews::ops;
    use chrono::Utc;
    use std::cmp::Ordering;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MemoryBookStore {
        books: Mutex<HashMap<Uuid, Book>>,
    }

    impl MemoryBookStore {
        /// Insert a catalog entry directly; book creation is out of band for
        /// the review workflow, so tests seed through this helper.
        pub fn seed_book(&self, title: &str, author: &str, isbn: &str, rating: f64) -> Book {
            let book = Book {
                id: Uuid::new_v4(),
                title: title.to_string(),
                author: author.to_string(),
                isbn: isbn.to_string(),
                rating,
                reviews: Vec::new(),
            };
            let mut books = self.books.lock().unwrap();
            books.insert(book.id, book.clone());
            book
        }
    }

    fn by_rating_desc(a: &Book, b: &Book) -> Ordering {
        b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal)
    }

    #[async_trait]
    impl BookStore for MemoryBookStore {
        async fn list(&self) -> Result<Vec<Book>, ServiceError> {
            let books = self.books.lock().unwrap();
            let mut all: Vec<Book> = books.values().cloned().collect();
            all.sort_by(|a, b| a.title.cmp(&b.title));
            Ok(all)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Book>, ServiceError> {
            let books = self.books.lock().unwrap();
            Ok(books.get(&id).cloned())
        }

        async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, ServiceError> {
            let books = self.books.lock().unwrap();
            Ok(books.values().find(|b| b.isbn == isbn).cloned())
        }

        async fn search(&self, filter: &BookFilter) -> Result<Vec<Book>, ServiceError> {
            let books = self.books.lock().unwrap();
            let mut hits: Vec<Book> = books
                .values()
                .filter(|b| {
                    filter
                        .author
                        .as_ref()
                        .map_or(true, |a| b.author.to_lowercase().contains(&a.to_lowercase()))
                        && filter
                            .title
                            .as_ref()
                            .map_or(true, |t| b.title.to_lowercase().contains(&t.to_lowercase()))
                        && filter.min_rating.map_or(true, |r| b.rating >= r)
                })
                .cloned()
                .collect();
            hits.sort_by(by_rating_desc);
            Ok(hits)
        }

        async fn with_min_rating(&self, rating: f64) -> Result<Vec<Book>, ServiceError> {
            let books = self.books.lock().unwrap();
            let mut hits: Vec<Book> = books
                .values()
                .filter(|b| b.rating >= rating)
                .cloned()
                .collect();
            hits.sort_by(by_rating_desc);
            Ok(hits)
        }

        async fn apply_review_mutation(
            &self,
            book_id: Uuid,
            mutation: ReviewMutation,
        ) -> Result<Option<Book>, ServiceError> {
            let mut books = self.books.lock().unwrap();
            let Some(book) = books.get_mut(&book_id) else {
                return Ok(None);
            };
            let outcome = ops::apply(&mut book.reviews, mutation, Utc::now())?;
            if let Some(rating) = outcome.new_book_rating {
                book.rating = rating;
            }
            Ok(Some(book.clone()))
        }
    }
}

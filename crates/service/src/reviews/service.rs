use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::catalog::domain::{Book, Review};
use crate::catalog::repository::BookStore;
use crate::errors::ServiceError;
use crate::reviews::ops::{self, ReviewMutation};

/// Application service for the review workflow, independent of the web
/// framework. Each call is a single atomic transition of one book.
pub struct ReviewService<S: BookStore> {
    store: Arc<S>,
}

impl<S: BookStore> ReviewService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Append a review and overwrite the book's aggregate rating with it.
    ///
    /// # Examples
    /// ```
    /// use service::catalog::repository::mock::MemoryBookStore;
    /// use service::reviews::ReviewService;
    /// use std::sync::Arc;
    /// let store = Arc::new(MemoryBookStore::default());
    /// let book = store.seed_book("Dune", "Frank Herbert", "9780441172719", 0.0);
    /// let svc = ReviewService::new(store);
    /// let user = uuid::Uuid::new_v4();
    /// let updated = tokio_test::block_on(svc.add_review(book.id, user, 4.0, "good".into())).unwrap();
    /// assert_eq!(updated.rating, 4.0);
    /// assert_eq!(updated.reviews.len(), 1);
    /// ```
    #[instrument(skip(self, comment), fields(book_id = %book_id, user_id = %user_id))]
    pub async fn add_review(
        &self,
        book_id: Uuid,
        user_id: Uuid,
        rating: f64,
        comment: String,
    ) -> Result<Book, ServiceError> {
        ops::validate_rating(rating)?;
        let book = self
            .store
            .apply_review_mutation(
                book_id,
                ReviewMutation::Add {
                    user_id,
                    rating,
                    comment,
                },
            )
            .await?
            .ok_or(ServiceError::BookNotFound)?;
        info!(book_id = %book.id, rating, reviews = book.reviews.len(), "review_added");
        Ok(book)
    }

    /// Rewrite rating/comment of a review owned by `user_id`; a miss on the
    /// (review, owner) pair is reported as the merged
    /// `ReviewNotFoundOrUnauthorized`.
    #[instrument(skip(self, comment), fields(book_id = %book_id, review_id = %review_id, user_id = %user_id))]
    pub async fn update_review(
        &self,
        book_id: Uuid,
        review_id: Uuid,
        user_id: Uuid,
        rating: f64,
        comment: String,
    ) -> Result<Book, ServiceError> {
        ops::validate_rating(rating)?;
        let book = self
            .store
            .apply_review_mutation(
                book_id,
                ReviewMutation::Update {
                    review_id,
                    user_id,
                    rating,
                    comment,
                },
            )
            .await?
            .ok_or(ServiceError::ReviewNotFoundOrUnauthorized)?;
        info!(book_id = %book.id, review_id = %review_id, "review_updated");
        Ok(book)
    }

    #[instrument(skip(self), fields(book_id = %book_id, review_id = %review_id, user_id = %user_id))]
    pub async fn delete_review(
        &self,
        book_id: Uuid,
        review_id: Uuid,
        user_id: Uuid,
    ) -> Result<Book, ServiceError> {
        let book = self
            .store
            .apply_review_mutation(book_id, ReviewMutation::Delete { review_id, user_id })
            .await?
            .ok_or(ServiceError::ReviewNotFoundOrUnauthorized)?;
        info!(book_id = %book.id, review_id = %review_id, "review_deleted");
        Ok(book)
    }

    /// Reviews of one book in creation order. A book without reviews yields
    /// `NoReviews`; an unknown book yields `BookNotFound`.
    pub async fn list_reviews(&self, book_id: Uuid) -> Result<Vec<Review>, ServiceError> {
        let book = self
            .store
            .find_by_id(book_id)
            .await?
            .ok_or(ServiceError::BookNotFound)?;
        if book.reviews.is_empty() {
            return Err(ServiceError::NoReviews);
        }
        Ok(book.reviews)
    }

    /// Books whose aggregate rating is at least `rating`, best first.
    pub async fn books_by_min_rating(&self, rating: f64) -> Result<Vec<Book>, ServiceError> {
        ops::validate_rating(rating)?;
        let books = self.store.with_min_rating(rating).await?;
        if books.is_empty() {
            return Err(ServiceError::NoResults);
        }
        Ok(books)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::repository::mock::MemoryBookStore;

    fn service_with_book() -> (ReviewService<MemoryBookStore>, Book, Arc<MemoryBookStore>) {
        let store = Arc::new(MemoryBookStore::default());
        let book = store.seed_book("Dune", "Frank Herbert", "9780441172719", 0.0);
        (ReviewService::new(Arc::clone(&store)), book, store)
    }

    #[tokio::test]
    async fn add_review_in_range_succeeds_and_out_of_range_leaves_book_unchanged() {
        let (svc, book, store) = service_with_book();
        let user = Uuid::new_v4();

        for r in [0.0, 3.5, 5.0] {
            let updated = svc.add_review(book.id, user, r, "ok".into()).await.unwrap();
            assert_eq!(updated.reviews.last().unwrap().rating, r);
            assert_eq!(updated.rating, r);
        }

        let before = store.find_by_id(book.id).await.unwrap().unwrap();
        for r in [-1.0, 5.5] {
            let err = svc.add_review(book.id, user, r, "no".into()).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
        }
        let after = store.find_by_id(book.id).await.unwrap().unwrap();
        assert_eq!(after.reviews.len(), before.reviews.len());
        assert_eq!(after.rating, before.rating);
    }

    #[tokio::test]
    async fn add_review_on_unknown_book_is_not_found() {
        let (svc, _book, _store) = service_with_book();
        let err = svc
            .add_review(Uuid::new_v4(), Uuid::new_v4(), 3.0, "x".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BookNotFound));
    }

    #[tokio::test]
    async fn update_by_non_owner_fails_even_when_review_exists() {
        let (svc, book, _store) = service_with_book();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let updated = svc.add_review(book.id, owner, 4.0, "good".into()).await.unwrap();
        let review_id = updated.reviews[0].id;

        let err = svc
            .update_review(book.id, review_id, other, 5.0, "x".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ReviewNotFoundOrUnauthorized));
    }

    #[tokio::test]
    async fn delete_then_list_never_returns_deleted_id() {
        let (svc, book, _store) = service_with_book();
        let owner = Uuid::new_v4();
        let updated = svc.add_review(book.id, owner, 4.0, "one".into()).await.unwrap();
        let first_id = updated.reviews[0].id;
        svc.add_review(book.id, owner, 3.0, "two".into()).await.unwrap();

        svc.delete_review(book.id, first_id, owner).await.unwrap();
        let remaining = svc.list_reviews(book.id).await.unwrap();
        assert!(remaining.iter().all(|r| r.id != first_id));
    }

    #[tokio::test]
    async fn list_reviews_distinguishes_empty_book_from_missing_book() {
        let (svc, book, _store) = service_with_book();
        let err = svc.list_reviews(book.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NoReviews));

        let err = svc.list_reviews(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::BookNotFound));
    }

    #[tokio::test]
    async fn books_by_min_rating_filters_and_sorts_descending() {
        let store = Arc::new(MemoryBookStore::default());
        store.seed_book("Low", "A", "isbn-1", 1.0);
        store.seed_book("Mid", "B", "isbn-2", 3.5);
        store.seed_book("High", "C", "isbn-3", 5.0);
        let svc = ReviewService::new(store);

        let hits = svc.books_by_min_rating(3.5).await.unwrap();
        let ratings: Vec<f64> = hits.iter().map(|b| b.rating).collect();
        assert_eq!(ratings, vec![5.0, 3.5]);

        let err = svc.books_by_min_rating(5.0).await.map(|v| v.len());
        assert_eq!(err.unwrap(), 1);

        let store = Arc::new(MemoryBookStore::default());
        let svc = ReviewService::new(store);
        let err = svc.books_by_min_rating(2.0).await.unwrap_err();
        assert!(matches!(err, ServiceError::NoResults));
    }

    #[tokio::test]
    async fn books_by_min_rating_rejects_out_of_range_threshold() {
        let (svc, _book, _store) = service_with_book();
        let err = svc.books_by_min_rating(6.0).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn concurrent_adds_never_lose_an_append() {
        let (_svc, book, store) = service_with_book();
        let svc = Arc::new(ReviewService::new(Arc::clone(&store)));

        let mut handles = Vec::new();
        for i in 0..8u32 {
            let svc = Arc::clone(&svc);
            let book_id = book.id;
            handles.push(tokio::spawn(async move {
                svc.add_review(book_id, Uuid::new_v4(), f64::from(i % 6), format!("r{i}"))
                    .await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let final_book = store.find_by_id(book.id).await.unwrap().unwrap();
        // every append landed; the aggregate rating is whichever add committed last
        assert_eq!(final_book.reviews.len(), 8);
        assert!(final_book
            .reviews
            .iter()
            .any(|r| r.rating == final_book.rating));
    }

    /// Scenario from the review workflow: add as u1, update as u2 fails,
    /// delete as u1 empties the list.
    #[tokio::test]
    async fn ownership_scenario_end_to_end() {
        let store = Arc::new(MemoryBookStore::default());
        let book = store.seed_book("B", "X", "123", 0.0);
        let svc = ReviewService::new(Arc::clone(&store));
        let u1 = Uuid::new_v4();
        let u2 = Uuid::new_v4();

        let updated = svc.add_review(book.id, u1, 4.0, "good".into()).await.unwrap();
        assert_eq!(updated.rating, 4.0);
        assert_eq!(updated.reviews.len(), 1);
        assert_eq!(updated.reviews[0].user_id, u1);
        let review_id = updated.reviews[0].id;

        let err = svc
            .update_review(book.id, review_id, u2, 5.0, "x".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ReviewNotFoundOrUnauthorized));

        let after = svc.delete_review(book.id, review_id, u1).await.unwrap();
        assert!(after.reviews.is_empty());
    }
}

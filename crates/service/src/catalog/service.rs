use std::sync::Arc;

use tracing::instrument;

use crate::catalog::domain::{Book, BookFilter};
use crate::catalog::repository::BookStore;
use crate::errors::ServiceError;

/// Read side of the catalog: listing and lookups. Mutations go through
/// `reviews::ReviewService`.
pub struct CatalogService<S: BookStore> {
    store: Arc<S>,
}

impl<S: BookStore> CatalogService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn list_books(&self) -> Result<Vec<Book>, ServiceError> {
        self.store.list().await
    }

    #[instrument(skip(self))]
    pub async fn find_by_isbn(&self, isbn: &str) -> Result<Book, ServiceError> {
        self.store
            .find_by_isbn(isbn)
            .await?
            .ok_or(ServiceError::BookNotFound)
    }

    /// Filtered search; an empty filter lists everything. Yields `NoResults`
    /// rather than an empty list so callers surface 404 for a miss.
    #[instrument(skip(self, filter))]
    pub async fn search(&self, filter: &BookFilter) -> Result<Vec<Book>, ServiceError> {
        let hits = self.store.search(filter).await?;
        if hits.is_empty() {
            return Err(ServiceError::NoResults);
        }
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::repository::mock::MemoryBookStore;

    fn seeded_store() -> Arc<MemoryBookStore> {
        let store = Arc::new(MemoryBookStore::default());
        store.seed_book("The Hobbit", "J. R. R. Tolkien", "9780547928227", 4.5);
        store.seed_book("The Silmarillion", "J. R. R. Tolkien", "9780544338012", 3.0);
        store.seed_book("Neuromancer", "William Gibson", "9780441569595", 4.0);
        store
    }

    #[tokio::test]
    async fn list_returns_every_book() {
        let svc = CatalogService::new(seeded_store());
        let all = svc.list_books().await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn find_by_isbn_hits_and_misses() {
        let svc = CatalogService::new(seeded_store());
        let book = svc.find_by_isbn("9780441569595").await.unwrap();
        assert_eq!(book.title, "Neuromancer");

        let err = svc.find_by_isbn("0000000000").await.unwrap_err();
        assert!(matches!(err, ServiceError::BookNotFound));
    }

    #[tokio::test]
    async fn search_matches_author_case_insensitively_sorted_by_rating() {
        let svc = CatalogService::new(seeded_store());
        let filter = BookFilter {
            author: Some("tolkien".into()),
            ..Default::default()
        };
        let hits = svc.search(&filter).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "The Hobbit"); // 4.5 before 3.0
    }

    #[tokio::test]
    async fn search_combines_title_and_min_rating() {
        let svc = CatalogService::new(seeded_store());
        let filter = BookFilter {
            title: Some("the".into()),
            min_rating: Some(4.0),
            ..Default::default()
        };
        let hits = svc.search(&filter).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].isbn, "9780547928227");
    }

    #[tokio::test]
    async fn search_miss_is_no_results() {
        let svc = CatalogService::new(seeded_store());
        let filter = BookFilter {
            author: Some("nobody".into()),
            ..Default::default()
        };
        let err = svc.search(&filter).await.unwrap_err();
        assert!(matches!(err, ServiceError::NoResults));
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::catalog::domain::{Book, BookFilter, Review};
use crate::catalog::repository::BookStore;
use crate::errors::ServiceError;
use crate::reviews::ops::{self, Applied, ReviewMutation};

/// SeaORM-backed book store. Review mutations run inside a transaction with
/// an exclusive row lock on the book, so read-modify-write on one book never
/// interleaves destructively.
pub struct SeaOrmBookStore {
    pub db: DatabaseConnection,
}

fn db_err(e: sea_orm::DbErr) -> ServiceError {
    ServiceError::Db(e.to_string())
}

async fn reviews_of<C: ConnectionTrait>(
    conn: &C,
    book_id: Uuid,
) -> Result<Vec<models::review::Model>, ServiceError> {
    models::review::Entity::find()
        .filter(models::review::Column::BookId.eq(book_id))
        .order_by_asc(models::review::Column::CreatedAt)
        .order_by_asc(models::review::Column::Id)
        .all(conn)
        .await
        .map_err(db_err)
}

/// Batch-load the review sequences of several books, keyed by book id.
async fn reviews_by_book<C: ConnectionTrait>(
    conn: &C,
    book_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<models::review::Model>>, ServiceError> {
    if book_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = models::review::Entity::find()
        .filter(models::review::Column::BookId.is_in(book_ids.iter().copied()))
        .order_by_asc(models::review::Column::CreatedAt)
        .order_by_asc(models::review::Column::Id)
        .all(conn)
        .await
        .map_err(db_err)?;
    let mut grouped: HashMap<Uuid, Vec<models::review::Model>> = HashMap::new();
    for row in rows {
        grouped.entry(row.book_id).or_default().push(row);
    }
    Ok(grouped)
}

async fn assemble<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<models::book::Model>,
) -> Result<Vec<Book>, ServiceError> {
    let ids: Vec<Uuid> = rows.iter().map(|b| b.id).collect();
    let mut grouped = reviews_by_book(conn, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|b| {
            let reviews = grouped.remove(&b.id).unwrap_or_default();
            Book::from_rows(b, reviews)
        })
        .collect())
}

#[async_trait]
impl BookStore for SeaOrmBookStore {
    async fn list(&self) -> Result<Vec<Book>, ServiceError> {
        let rows = models::book::Entity::find()
            .order_by_asc(models::book::Column::Title)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        assemble(&self.db, rows).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Book>, ServiceError> {
        let Some(row) = models::book::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };
        let reviews = reviews_of(&self.db, row.id).await?;
        Ok(Some(Book::from_rows(row, reviews)))
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, ServiceError> {
        let Some(row) = models::book::find_by_isbn(&self.db, isbn).await? else {
            return Ok(None);
        };
        let reviews = reviews_of(&self.db, row.id).await?;
        Ok(Some(Book::from_rows(row, reviews)))
    }

    async fn search(&self, filter: &BookFilter) -> Result<Vec<Book>, ServiceError> {
        let mut query = models::book::Entity::find();
        if let Some(author) = filter.author.as_deref().filter(|s| !s.trim().is_empty()) {
            query = query.filter(
                Expr::col(models::book::Column::Author).ilike(format!("%{}%", author.trim())),
            );
        }
        if let Some(title) = filter.title.as_deref().filter(|s| !s.trim().is_empty()) {
            query = query.filter(
                Expr::col(models::book::Column::Title).ilike(format!("%{}%", title.trim())),
            );
        }
        if let Some(min_rating) = filter.min_rating {
            query = query.filter(models::book::Column::Rating.gte(min_rating));
        }
        let rows = query
            .order_by_desc(models::book::Column::Rating)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        assemble(&self.db, rows).await
    }

    async fn with_min_rating(&self, rating: f64) -> Result<Vec<Book>, ServiceError> {
        let rows = models::book::Entity::find()
            .filter(models::book::Column::Rating.gte(rating))
            .order_by_desc(models::book::Column::Rating)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        assemble(&self.db, rows).await
    }

    async fn apply_review_mutation(
        &self,
        book_id: Uuid,
        mutation: ReviewMutation,
    ) -> Result<Option<Book>, ServiceError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        // Lock the book row for the duration of the read-modify-write.
        let Some(book_row) = models::book::Entity::find_by_id(book_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
        else {
            txn.rollback().await.map_err(db_err)?;
            return Ok(None);
        };

        let review_rows = reviews_of(&txn, book_id).await?;
        let mut reviews: Vec<Review> = review_rows.into_iter().map(Review::from).collect();

        let now = Utc::now();
        let outcome = match ops::apply(&mut reviews, mutation, now) {
            Ok(outcome) => outcome,
            Err(e) => {
                txn.rollback().await.map_err(db_err)?;
                return Err(e);
            }
        };

        match &outcome.applied {
            Applied::Inserted(r) => {
                let am = models::review::ActiveModel {
                    id: Set(r.id),
                    book_id: Set(book_id),
                    user_id: Set(r.user_id),
                    rating: Set(r.rating),
                    comment: Set(r.comment.clone()),
                    created_at: Set(r.created_at.into()),
                    updated_at: Set(None),
                };
                am.insert(&txn).await.map_err(db_err)?;
            }
            Applied::Updated(r) => {
                let am = models::review::ActiveModel {
                    id: Set(r.id),
                    rating: Set(r.rating),
                    comment: Set(r.comment.clone()),
                    updated_at: Set(r.updated_at.map(Into::into)),
                    ..Default::default()
                };
                am.update(&txn).await.map_err(db_err)?;
            }
            Applied::Removed(id) => {
                models::review::Entity::delete_by_id(*id)
                    .exec(&txn)
                    .await
                    .map_err(db_err)?;
            }
        }

        let rating = match outcome.new_book_rating {
            Some(new_rating) => {
                let mut am: models::book::ActiveModel = book_row.clone().into();
                am.rating = Set(new_rating);
                am.updated_at = Set(now.into());
                am.update(&txn).await.map_err(db_err)?;
                new_rating
            }
            None => book_row.rating,
        };

        txn.commit().await.map_err(db_err)?;

        Ok(Some(Book {
            id: book_row.id,
            title: book_row.title,
            author: book_row.author,
            isbn: book_row.isbn,
            rating,
            reviews,
        }))
    }
}

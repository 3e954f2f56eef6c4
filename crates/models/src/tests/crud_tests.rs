use crate::db::connect;
use crate::{book, reader, review};
use anyhow::Result;
use chrono::Utc;
use migration::MigratorTrait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

/// Setup test database with migrations
async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = connect().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::test]
async fn test_book_crud() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;

    let isbn = format!("isbn-{}", Uuid::new_v4().simple());
    let created = book::create(&db, "The Rust Book", "Steve Klabnik", &isbn).await?;

    assert_eq!(created.title, "The Rust Book");
    assert_eq!(created.isbn, isbn);
    assert_eq!(created.rating, 0.0);

    let found = book::Entity::find_by_id(created.id).one(&db).await?;
    assert!(found.is_some());
    assert_eq!(found.unwrap().isbn, isbn);

    let by_isbn = book::find_by_isbn(&db, &isbn).await?;
    assert!(by_isbn.is_some());
    assert_eq!(by_isbn.unwrap().id, created.id);

    book::hard_delete(&db, created.id).await?;
    let gone = book::Entity::find_by_id(created.id).one(&db).await?;
    assert!(gone.is_none());

    Ok(())
}

#[tokio::test]
async fn test_book_validation_rejects_bad_input() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;

    assert!(book::create(&db, "", "A", "123").await.is_err());
    assert!(book::create(&db, "T", "", "123").await.is_err());
    assert!(book::create(&db, "T", "A", "").await.is_err());
    assert!(book::create(&db, "T", "A", "isbn with spaces").await.is_err());

    Ok(())
}

#[tokio::test]
async fn test_reader_crud() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;

    let username = format!("reader_{}", Uuid::new_v4().simple());
    let created = reader::create(&db, &username, "argon2-hash-placeholder").await?;
    assert_eq!(created.username, username);

    let found = reader::find_by_username(&db, &username).await?;
    assert!(found.is_some());
    assert_eq!(found.unwrap().id, created.id);

    // Duplicate username violates the unique index
    assert!(reader::create(&db, &username, "other-hash").await.is_err());

    reader::hard_delete(&db, created.id).await?;
    Ok(())
}

#[tokio::test]
async fn test_review_rows_follow_book_lifecycle() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;

    let isbn = format!("isbn-{}", Uuid::new_v4().simple());
    let b = book::create(&db, "Reviewed Book", "An Author", &isbn).await?;
    let username = format!("reviewer_{}", Uuid::new_v4().simple());
    let r = reader::create(&db, &username, "hash").await?;

    let first = review::ActiveModel {
        id: Set(Uuid::new_v4()),
        book_id: Set(b.id),
        user_id: Set(r.id),
        rating: Set(4.0),
        comment: Set("good".into()),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    };
    let first = first.insert(&db).await?;

    let second = review::ActiveModel {
        id: Set(Uuid::new_v4()),
        book_id: Set(b.id),
        user_id: Set(r.id),
        rating: Set(2.5),
        comment: Set("reread, worse".into()),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    };
    let second = second.insert(&db).await?;

    let rows = review::Entity::find()
        .filter(review::Column::BookId.eq(b.id))
        .order_by_asc(review::Column::CreatedAt)
        .order_by_asc(review::Column::Id)
        .all(&db)
        .await?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, first.id);
    assert_eq!(rows[1].id, second.id);
    assert!(rows.iter().all(|row| row.updated_at.is_none()));

    // Cascade: deleting the book removes its reviews
    book::hard_delete(&db, b.id).await?;
    let orphaned = review::Entity::find()
        .filter(review::Column::BookId.eq(b.id))
        .all(&db)
        .await?;
    assert!(orphaned.is_empty());

    reader::hard_delete(&db, r.id).await?;
    Ok(())
}

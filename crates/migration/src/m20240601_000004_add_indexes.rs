use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Review lookup: reviews of a book in creation order
        manager
            .create_index(
                Index::create()
                    .name("idx_review_book_created")
                    .table(Review::Table)
                    .col(Review::BookId)
                    .col(Review::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Ownership check: (book, review, owner) resolves a single row
        manager
            .create_index(
                Index::create()
                    .name("idx_review_owner")
                    .table(Review::Table)
                    .col(Review::Id)
                    .col(Review::UserId)
                    .to_owned(),
            )
            .await?;

        // Min-rating listing sorts on rating
        manager
            .create_index(
                Index::create()
                    .name("idx_book_rating")
                    .table(Book::Table)
                    .col(Book::Rating)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_review_book_created")
                    .table(Review::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_review_owner")
                    .table(Review::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_book_rating")
                    .table(Book::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Review {
    Table,
    Id,
    BookId,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Book {
    Table,
    Rating,
}

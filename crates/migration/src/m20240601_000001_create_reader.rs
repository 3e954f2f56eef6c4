//! Create `reader` table.
//!
//! Registered accounts that may author reviews; username is unique.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reader::Table)
                    .if_not_exists()
                    .col(uuid(Reader::Id).primary_key())
                    .col(string_len(Reader::Username, 64).unique_key().not_null())
                    .col(string_len(Reader::PasswordHash, 255).not_null())
                    .col(timestamp_with_time_zone(Reader::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reader::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Reader {
    Table,
    Id,
    Username,
    PasswordHash,
    CreatedAt,
}

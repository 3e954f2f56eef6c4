use sea_orm::DatabaseConnection;

use crate::auth::domain::{Reader, ReaderRecord};
use crate::auth::errors::AuthError;
use crate::auth::repository::ReaderRepository;

pub struct SeaOrmReaderRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl ReaderRepository for SeaOrmReaderRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<ReaderRecord>, AuthError> {
        let row = models::reader::find_by_username(&self.db, username)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(row.map(|r| ReaderRecord {
            reader: Reader {
                id: r.id,
                username: r.username,
            },
            password_hash: r.password_hash,
        }))
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<Reader, AuthError> {
        let created = models::reader::create(&self.db, username, password_hash)
            .await
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        Ok(Reader {
            id: created.id,
            username: created.username,
        })
    }
}

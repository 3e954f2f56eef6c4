use async_trait::async_trait;

use super::domain::{Reader, ReaderRecord};
use super::errors::AuthError;

/// Repository abstraction for reader-account persistence.
#[async_trait]
pub trait ReaderRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<ReaderRecord>, AuthError>;
    async fn create(&self, username: &str, password_hash: &str) -> Result<Reader, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    pub struct MockReaderRepository {
        readers: Mutex<HashMap<String, ReaderRecord>>, // key: username
    }

    #[async_trait]
    impl ReaderRepository for MockReaderRepository {
        async fn find_by_username(
            &self,
            username: &str,
        ) -> Result<Option<ReaderRecord>, AuthError> {
            let readers = self.readers.lock().unwrap();
            Ok(readers.get(username).cloned())
        }

        async fn create(&self, username: &str, password_hash: &str) -> Result<Reader, AuthError> {
            let mut readers = self.readers.lock().unwrap();
            if readers.contains_key(username) {
                return Err(AuthError::Conflict);
            }
            let reader = Reader {
                id: Uuid::new_v4(),
                username: username.to_string(),
            };
            readers.insert(
                username.to_string(),
                ReaderRecord {
                    reader: reader.clone(),
                    password_hash: password_hash.to_string(),
                },
            );
            Ok(reader)
        }
    }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Domain reader (business view, no secrets)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reader {
    pub id: Uuid,
    pub username: String,
}

/// Reader plus stored credential hash, as the repository returns it
#[derive(Debug, Clone)]
pub struct ReaderRecord {
    pub reader: Reader,
    pub password_hash: String,
}

/// Login result (session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub reader: Reader,
    pub token: Option<String>,
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("book not found")]
    BookNotFound,
    /// Deliberately merged: the caller cannot tell a missing review from a
    /// review owned by someone else.
    #[error("review not found or unauthorized")]
    ReviewNotFoundOrUnauthorized,
    #[error("no reviews recorded for this book")]
    NoReviews,
    #[error("no books matched the query")]
    NoResults,
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 2001,
            ServiceError::BookNotFound => 2002,
            ServiceError::ReviewNotFoundOrUnauthorized => 2003,
            ServiceError::NoReviews => 2004,
            ServiceError::NoResults => 2005,
            ServiceError::Db(_) => 2100,
            ServiceError::Model(_) => 2101,
        }
    }
}

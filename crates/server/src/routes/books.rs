use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{error, info};

use service::catalog::domain::{Book, BookFilter};
use service::catalog::CatalogService;
use service::errors::ServiceError;

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    pub author: Option<String>,
    pub title: Option<String>,
    /// Minimum aggregate rating
    pub rating: Option<f64>,
}

#[utoipa::path(get, path = "/books", tag = "catalog",
    responses(
        (status = 200, description = "All catalog entries"),
        (status = 500, description = "List Failed")
    )
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Book>>, JsonApiError> {
    let svc = CatalogService::new(state.store.clone());
    match svc.list_books().await {
        Ok(books) => {
            info!(count = books.len(), "list books");
            Ok(Json(books))
        }
        Err(e) => {
            error!(err = %e, code = e.code(), "list books failed");
            Err(JsonApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "List Failed",
                Some(e.to_string()),
            ))
        }
    }
}

#[utoipa::path(get, path = "/books/isbn/{isbn}", tag = "catalog",
    params(("isbn" = String, Path, description = "Book ISBN")),
    responses(
        (status = 200, description = "Book"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_by_isbn(
    State(state): State<ServerState>,
    Path(isbn): Path<String>,
) -> Result<Json<Book>, JsonApiError> {
    let svc = CatalogService::new(state.store.clone());
    match svc.find_by_isbn(&isbn).await {
        Ok(book) => Ok(Json(book)),
        Err(ServiceError::BookNotFound) => Err(JsonApiError::new(
            StatusCode::NOT_FOUND,
            "Not Found",
            Some(format!("book with ISBN {} not found", isbn)),
        )),
        Err(e) => {
            error!(err = %e, code = e.code(), "isbn lookup failed");
            Err(JsonApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Lookup Failed",
                Some(e.to_string()),
            ))
        }
    }
}

#[utoipa::path(get, path = "/books/search", tag = "catalog",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching books"),
        (status = 404, description = "No Match")
    )
)]
pub async fn search(
    State(state): State<ServerState>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<Book>>, JsonApiError> {
    let filter = BookFilter {
        author: q.author,
        title: q.title,
        min_rating: q.rating,
    };
    let svc = CatalogService::new(state.store.clone());
    match svc.search(&filter).await {
        Ok(books) => {
            info!(count = books.len(), "search books");
            Ok(Json(books))
        }
        Err(ServiceError::NoResults) => Err(JsonApiError::new(
            StatusCode::NOT_FOUND,
            "No Match",
            Some("no books found matching criteria".into()),
        )),
        Err(e) => {
            error!(err = %e, code = e.code(), "search failed");
            Err(JsonApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Search Failed",
                Some(e.to_string()),
            ))
        }
    }
}

#[utoipa::path(get, path = "/books/review/{rating}", tag = "catalog",
    params(("rating" = f64, Path, description = "Minimum aggregate rating, 0..=5")),
    responses(
        (status = 200, description = "Books at or above the rating"),
        (status = 400, description = "Invalid rating"),
        (status = 404, description = "None found")
    )
)]
pub async fn by_min_rating(
    State(state): State<ServerState>,
    Path(rating): Path<String>,
) -> Result<Json<Vec<Book>>, JsonApiError> {
    // Parse by hand so a malformed rating is a 400, not a routing error
    let Ok(min_rating) = rating.parse::<f64>() else {
        return Err(JsonApiError::new(
            StatusCode::BAD_REQUEST,
            "Invalid Rating",
            Some("rating must be a number between 0 and 5".into()),
        ));
    };

    let svc = service::reviews::ReviewService::new(state.store.clone());
    match svc.books_by_min_rating(min_rating).await {
        Ok(books) => Ok(Json(books)),
        Err(e @ ServiceError::Validation(_)) => Err(JsonApiError::new(
            StatusCode::BAD_REQUEST,
            "Invalid Rating",
            Some(e.to_string()),
        )),
        Err(ServiceError::NoResults) => Err(JsonApiError::new(
            StatusCode::NOT_FOUND,
            "No Match",
            Some(format!("no books found with rating {} or higher", min_rating)),
        )),
        Err(e) => {
            error!(err = %e, code = e.code(), "min-rating listing failed");
            Err(JsonApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Listing Failed",
                Some(e.to_string()),
            ))
        }
    }
}

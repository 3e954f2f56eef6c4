use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use service::catalog::domain::{Book, Review};
use service::errors::ServiceError;
use service::reviews::ReviewService;

use crate::errors::JsonApiError;
use crate::routes::auth::{CurrentReader, ServerState};

#[derive(Debug, Deserialize)]
pub struct ReviewInput {
    pub rating: f64,
    #[serde(default)]
    pub comment: String,
}

fn mutation_error(e: ServiceError) -> JsonApiError {
    match e {
        ServiceError::Validation(_) => {
            JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(e.to_string()))
        }
        // The review workflow reports every miss as a 400 on mutations,
        // including the merged not-found-or-unauthorized case.
        ServiceError::BookNotFound | ServiceError::ReviewNotFoundOrUnauthorized => {
            JsonApiError::new(StatusCode::BAD_REQUEST, "Not Found", Some(e.to_string()))
        }
        e => {
            error!(err = %e, code = e.code(), "review mutation failed");
            JsonApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Mutation Failed",
                Some(e.to_string()),
            )
        }
    }
}

#[utoipa::path(get, path = "/books/{book_id}/reviews", tag = "reviews",
    params(("book_id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Reviews in creation order"),
        (status = 404, description = "Unknown book or no reviews")
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<Vec<Review>>, JsonApiError> {
    let svc = ReviewService::new(state.store.clone());
    match svc.list_reviews(book_id).await {
        Ok(reviews) => Ok(Json(reviews)),
        Err(e @ (ServiceError::BookNotFound | ServiceError::NoReviews)) => Err(JsonApiError::new(
            StatusCode::NOT_FOUND,
            "Not Found",
            Some(e.to_string()),
        )),
        Err(e) => {
            error!(err = %e, code = e.code(), "list reviews failed");
            Err(JsonApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "List Failed",
                Some(e.to_string()),
            ))
        }
    }
}

#[utoipa::path(post, path = "/books/{book_id}/reviews", tag = "reviews",
    params(("book_id" = Uuid, Path, description = "Book ID")),
    request_body = crate::openapi::ReviewInputDoc,
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Updated book"),
        (status = 400, description = "Bad rating or unknown book"),
        (status = 401, description = "Invalid token"),
        (status = 403, description = "Missing token")
    )
)]
pub async fn add(
    State(state): State<ServerState>,
    Path(book_id): Path<Uuid>,
    Extension(reader): Extension<CurrentReader>,
    Json(input): Json<ReviewInput>,
) -> Result<Json<Book>, JsonApiError> {
    let svc = ReviewService::new(state.store.clone());
    let book = svc
        .add_review(book_id, reader.id, input.rating, input.comment)
        .await
        .map_err(mutation_error)?;
    info!(book_id = %book.id, reader = %reader.username, "review added");
    Ok(Json(book))
}

#[utoipa::path(put, path = "/books/{book_id}/reviews/{review_id}", tag = "reviews",
    params(
        ("book_id" = Uuid, Path, description = "Book ID"),
        ("review_id" = Uuid, Path, description = "Review ID")
    ),
    request_body = crate::openapi::ReviewInputDoc,
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Updated book"),
        (status = 400, description = "Bad rating, or review missing / not owned"),
        (status = 401, description = "Invalid token"),
        (status = 403, description = "Missing token")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path((book_id, review_id)): Path<(Uuid, Uuid)>,
    Extension(reader): Extension<CurrentReader>,
    Json(input): Json<ReviewInput>,
) -> Result<Json<Book>, JsonApiError> {
    let svc = ReviewService::new(state.store.clone());
    let book = svc
        .update_review(book_id, review_id, reader.id, input.rating, input.comment)
        .await
        .map_err(mutation_error)?;
    info!(book_id = %book.id, review_id = %review_id, reader = %reader.username, "review updated");
    Ok(Json(book))
}

#[utoipa::path(delete, path = "/books/{book_id}/reviews/{review_id}", tag = "reviews",
    params(
        ("book_id" = Uuid, Path, description = "Book ID"),
        ("review_id" = Uuid, Path, description = "Review ID")
    ),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Updated book"),
        (status = 400, description = "Review missing / not owned"),
        (status = 401, description = "Invalid token"),
        (status = 403, description = "Missing token")
    )
)]
pub async fn remove(
    State(state): State<ServerState>,
    Path((book_id, review_id)): Path<(Uuid, Uuid)>,
    Extension(reader): Extension<CurrentReader>,
) -> Result<Json<Book>, JsonApiError> {
    let svc = ReviewService::new(state.store.clone());
    let book = svc
        .delete_review(book_id, review_id, reader.id)
        .await
        .map_err(mutation_error)?;
    info!(book_id = %book.id, review_id = %review_id, reader = %reader.username, "review deleted");
    Ok(Json(book))
}

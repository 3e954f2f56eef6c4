//! Pure review-sequence transitions.
//!
//! Every store implementation funnels mutations through [`apply`] so the
//! SeaORM store and the in-memory store cannot drift apart. The functions
//! here never touch a database: they transform the review sequence of one
//! book and report what changed.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::catalog::domain::Review;
use crate::errors::ServiceError;

/// One atomic transition of a book's review sequence, keyed by
/// (review id, owning user id) for update/delete.
#[derive(Debug, Clone)]
pub enum ReviewMutation {
    Add {
        user_id: Uuid,
        rating: f64,
        comment: String,
    },
    Update {
        review_id: Uuid,
        user_id: Uuid,
        rating: f64,
        comment: String,
    },
    Delete {
        review_id: Uuid,
        user_id: Uuid,
    },
}

/// Row-level change produced by a mutation; stores translate this into
/// their own write primitives.
#[derive(Debug, Clone)]
pub enum Applied {
    Inserted(Review),
    Updated(Review),
    Removed(Uuid),
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub applied: Applied,
    /// `Some` only when the book's aggregate rating must be overwritten;
    /// only `Add` does this (the newest review's rating wins).
    pub new_book_rating: Option<f64>,
}

pub fn validate_rating(rating: f64) -> Result<(), ServiceError> {
    if !(0.0..=5.0).contains(&rating) {
        return Err(ServiceError::Validation(
            "rating must be between 0 and 5".into(),
        ));
    }
    Ok(())
}

/// Apply one mutation to a consistent snapshot of a book's reviews.
///
/// Validation failures and ownership misses return before anything is
/// mutated, so a failed call leaves the sequence untouched. An update or
/// delete that matches no (review id, user id) pair yields the deliberately
/// ambiguous `ReviewNotFoundOrUnauthorized`.
pub fn apply(
    reviews: &mut Vec<Review>,
    mutation: ReviewMutation,
    now: DateTime<Utc>,
) -> Result<Outcome, ServiceError> {
    match mutation {
        ReviewMutation::Add {
            user_id,
            rating,
            comment,
        } => {
            validate_rating(rating)?;
            let review = Review {
                id: Uuid::new_v4(),
                user_id,
                rating,
                comment,
                created_at: now,
                updated_at: None,
            };
            reviews.push(review.clone());
            Ok(Outcome {
                applied: Applied::Inserted(review),
                new_book_rating: Some(rating),
            })
        }
        ReviewMutation::Update {
            review_id,
            user_id,
            rating,
            comment,
        } => {
            validate_rating(rating)?;
            let slot = reviews
                .iter_mut()
                .find(|r| r.id == review_id && r.user_id == user_id)
                .ok_or(ServiceError::ReviewNotFoundOrUnauthorized)?;
            slot.rating = rating;
            slot.comment = comment;
            slot.updated_at = Some(now);
            Ok(Outcome {
                applied: Applied::Updated(slot.clone()),
                new_book_rating: None,
            })
        }
        ReviewMutation::Delete { review_id, user_id } => {
            let pos = reviews
                .iter()
                .position(|r| r.id == review_id && r.user_id == user_id)
                .ok_or(ServiceError::ReviewNotFoundOrUnauthorized)?;
            reviews.remove(pos);
            Ok(Outcome {
                applied: Applied::Removed(review_id),
                new_book_rating: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(user_id: Uuid, rating: f64) -> ReviewMutation {
        ReviewMutation::Add {
            user_id,
            rating,
            comment: "c".into(),
        }
    }

    #[test]
    fn add_appends_and_overwrites_rating() {
        let mut reviews = Vec::new();
        let user = Uuid::new_v4();
        for r in [0.0, 2.5, 5.0] {
            let out = apply(&mut reviews, add(user, r), Utc::now()).expect("valid rating");
            assert_eq!(out.new_book_rating, Some(r));
            match out.applied {
                Applied::Inserted(ref rev) => assert_eq!(rev.rating, r),
                _ => panic!("expected insert"),
            }
        }
        assert_eq!(reviews.len(), 3);
        // insertion order preserved
        assert_eq!(reviews[0].rating, 0.0);
        assert_eq!(reviews[2].rating, 5.0);
    }

    #[test]
    fn out_of_range_rating_rejected_before_mutation() {
        let mut reviews = Vec::new();
        let user = Uuid::new_v4();
        for r in [-0.1, 5.1, f64::NAN] {
            let err = apply(&mut reviews, add(user, r), Utc::now()).unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
        }
        assert!(reviews.is_empty());
    }

    #[test]
    fn update_requires_ownership() {
        let mut reviews = Vec::new();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        apply(&mut reviews, add(owner, 4.0), Utc::now()).unwrap();
        let review_id = reviews[0].id;

        let err = apply(
            &mut reviews,
            ReviewMutation::Update {
                review_id,
                user_id: stranger,
                rating: 5.0,
                comment: "x".into(),
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::ReviewNotFoundOrUnauthorized));
        // untouched
        assert_eq!(reviews[0].rating, 4.0);
        assert!(reviews[0].updated_at.is_none());
    }

    #[test]
    fn update_rewrites_fields_and_sets_timestamp() {
        let mut reviews = Vec::new();
        let owner = Uuid::new_v4();
        apply(&mut reviews, add(owner, 4.0), Utc::now()).unwrap();
        let review_id = reviews[0].id;

        let now = Utc::now();
        let out = apply(
            &mut reviews,
            ReviewMutation::Update {
                review_id,
                user_id: owner,
                rating: 2.0,
                comment: "revised".into(),
            },
            now,
        )
        .unwrap();
        // updates never touch the aggregate rating
        assert_eq!(out.new_book_rating, None);
        assert_eq!(reviews[0].rating, 2.0);
        assert_eq!(reviews[0].comment, "revised");
        assert_eq!(reviews[0].updated_at, Some(now));
        // owner is immutable
        assert_eq!(reviews[0].user_id, owner);
    }

    #[test]
    fn update_is_idempotent() {
        let mut reviews = Vec::new();
        let owner = Uuid::new_v4();
        apply(&mut reviews, add(owner, 4.0), Utc::now()).unwrap();
        let review_id = reviews[0].id;

        let now = Utc::now();
        let mutation = ReviewMutation::Update {
            review_id,
            user_id: owner,
            rating: 3.0,
            comment: "same".into(),
        };
        apply(&mut reviews, mutation.clone(), now).unwrap();
        let once = reviews.clone();
        apply(&mut reviews, mutation, now).unwrap();
        assert_eq!(reviews, once);
    }

    #[test]
    fn delete_requires_ownership_and_removes() {
        let mut reviews = Vec::new();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        apply(&mut reviews, add(owner, 4.0), Utc::now()).unwrap();
        let review_id = reviews[0].id;

        let err = apply(
            &mut reviews,
            ReviewMutation::Delete {
                review_id,
                user_id: stranger,
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::ReviewNotFoundOrUnauthorized));
        assert_eq!(reviews.len(), 1);

        apply(
            &mut reviews,
            ReviewMutation::Delete {
                review_id,
                user_id: owner,
            },
            Utc::now(),
        )
        .unwrap();
        assert!(reviews.is_empty());

        // deleting again reports the merged error
        let err = apply(
            &mut reviews,
            ReviewMutation::Delete {
                review_id,
                user_id: owner,
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::ReviewNotFoundOrUnauthorized));
    }
}

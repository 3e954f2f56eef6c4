//! Service layer providing the business rules of the book-review catalog.
//! - `catalog`: domain types and the book store abstraction (single source of truth).
//! - `reviews`: review mutations as pure state transitions plus their application services.
//! - `auth`: registration/login with hashed passwords and JWT issuance.
//! - Separated from the HTTP layer; every store access goes through a repository trait.

pub mod auth;
pub mod catalog;
pub mod errors;
pub mod reviews;

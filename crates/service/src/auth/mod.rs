//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration and login for readers; passwords hashed with argon2,
//! sessions carried as HS256 JWTs.

pub mod domain;
pub mod errors;
pub mod repo;
pub mod repository;
pub mod service;

pub use service::AuthService;

//! Catalog module: domain types, the book store abstraction and its
//! implementations (SeaORM-backed and in-memory for tests).

pub mod domain;
pub mod repo;
pub mod repository;
pub mod service;

pub use repository::BookStore;
pub use service::CatalogService;

//! Review workflow: pure mutation functions shared by every store
//! implementation, plus the application service that drives them.

pub mod ops;
pub mod service;

pub use ops::ReviewMutation;
pub use service::ReviewService;

//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod review_image_repo;
pub mod review_repo;

pub use review_image_repo::ReviewImageRepo;
pub use review_repo::ReviewRepo;

//! Row models and DTOs for the review tables.

pub mod review;

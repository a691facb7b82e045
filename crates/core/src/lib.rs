//! Domain core of the review service.
//!
//! Holds everything the review write path needs that does not touch HTTP or
//! SQL directly: shared types, the error taxonomy, submission validation,
//! caller-context propagation, the capability traits for the remote
//! collaborators, encoded image parsing, the image relay and the
//! [`submission::ReviewWriteCoordinator`] that sequences them.

pub mod context;
pub mod error;
pub mod image_payload;
pub mod image_relay;
pub mod review;
pub mod services;
pub mod submission;
pub mod types;

#[cfg(test)]
mod test_doubles;

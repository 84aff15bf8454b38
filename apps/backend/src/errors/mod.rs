//! Error handling for the game backend.

pub mod domain;

pub use domain::{DomainError, NotFoundKind};

//! Domain layer types and invariants.

pub mod contacts;
pub mod entities;
pub mod error;
pub mod posts;

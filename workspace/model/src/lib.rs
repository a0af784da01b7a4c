//! Entities and domain operations of the finance tracker.
//!
//! Each entity module holds the SeaORM model together with the validated
//! create/read/update/delete operations for that table. Relationships are
//! plain foreign-key fields resolved through explicit lookups.

pub mod entities;
pub mod error;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ModelError, Result};

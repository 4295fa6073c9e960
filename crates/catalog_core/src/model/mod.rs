//! Versioned catalog domain model.
//!
//! # Responsibility
//! - Define the record shape shared by organizations, companies, members and
//!   all of their nested sub-records.
//! - Provide the immutable entity graph snapshot consumed by change detection.
//!
//! # Invariants
//! - Every record carries `StatusInfo` temporal metadata.
//! - Deletion is represented by a `removed` tombstone, never by hard delete.

pub mod graph;
pub mod kind;
pub mod record;
pub mod status;

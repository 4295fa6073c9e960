//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract the change service resolves roots and
//!   hydrates graphs through.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `VersionedRecord::validate()` before
//!   persistence.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateKey`) in
//!   addition to DB transport errors.

pub mod catalog_repo;

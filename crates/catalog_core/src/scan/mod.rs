//! Temporal change detection over loaded entity graphs.
//!
//! # Responsibility
//! - Define the `(since, until]` change window and the change report.
//! - Decide, per declared category, whether anything changed in the window.
//!
//! # Invariants
//! - Detection looks at temporal metadata only, never at field values.
//! - Reports carry category names, not record instances.

pub mod report;
pub mod scanner;
pub mod window;

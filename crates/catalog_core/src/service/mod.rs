//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate key validation, repository resolution and change scans into
//!   use-case level APIs.
//! - Keep transport layers decoupled from storage details.

pub mod change_service;
pub mod lookup;

//! Temporal change detection over the registry catalog.
//!
//! Catalog entities are stored as versioned records arranged in composition
//! graphs under three root kinds: organizations, companies and members. This
//! crate answers which categories of one entity changed inside a time window.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod scan;
pub mod schema;
pub mod service;

pub use config::{CatalogConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::graph::{EntityGraph, GraphError};
pub use model::kind::EntityKind;
pub use model::record::{BusinessKey, RecordId, RecordValidationError, VersionedRecord};
pub use model::status::StatusInfo;
pub use repo::catalog_repo::{
    hydrate_graph, CatalogRepository, RepoError, RepoResult, SqliteCatalogRepository,
};
pub use scan::report::ChangeReport;
pub use scan::scanner::ChangeScanner;
pub use scan::window::ChangeWindow;
pub use schema::{catalog_schema, CompositionSchema, SchemaError};
pub use service::change_service::{CatalogError, ChangeService, ChangedEntity};
pub use service::lookup::LookupRequest;

/// Minimal health-check API for integration checks.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

//! Change-detection use-case service.
//!
//! # Responsibility
//! - Validate caller keys before anything touches storage.
//! - Resolve the root through the repository and scan its loaded graph.
//!
//! # Invariants
//! - Validation failures never reach the repository or the scanner.
//! - A request yields a complete report or one terminal error, never a
//!   partial result.
//! - Removed roots stay resolvable; their removal is reported as a change of
//!   the root category.

use crate::model::kind::EntityKind;
use crate::model::record::BusinessKey;
use crate::repo::catalog_repo::{CatalogRepository, RepoError};
use crate::scan::report::ChangeReport;
use crate::scan::scanner::ChangeScanner;
use crate::scan::window::ChangeWindow;
use crate::schema::{catalog_schema, CompositionSchema, SchemaError};
use crate::service::lookup::{not_found_message, LookupRequest};
use chrono::NaiveDateTime;
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Terminal errors of a change query. Display text is caller-facing.
#[derive(Debug)]
pub enum CatalogError {
    /// A required key field was unset or blank.
    Validation { field: &'static str },
    /// No root record matches the supplied key.
    NotFound(BusinessKey),
    /// Schema wiring defect.
    Configuration(SchemaError),
    Repo(RepoError),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation { field } => write!(f, "{field} is a required parameter"),
            Self::NotFound(key) => f.write_str(&not_found_message(key)),
            Self::Configuration(err) => write!(f, "catalog schema misconfigured: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Configuration(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SchemaError> for CatalogError {
    fn from(value: SchemaError) -> Self {
        Self::Configuration(value)
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl CatalogError {
    /// Stable short code for log lines.
    fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::NotFound(_) => "not_found",
            Self::Configuration(_) => "configuration",
            Self::Repo(_) => "repository",
        }
    }
}

/// One root that changed inside a listing window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedEntity {
    pub key: BusinessKey,
    pub report: ChangeReport,
}

/// Change-detection service facade.
pub struct ChangeService<'s, R: CatalogRepository> {
    repo: R,
    schema: &'s CompositionSchema,
}

impl<R: CatalogRepository> ChangeService<'static, R> {
    /// Creates a service over the built-in catalog schema.
    pub fn new(repo: R) -> Result<Self, CatalogError> {
        Ok(Self::with_schema(repo, catalog_schema()?))
    }
}

impl<'s, R: CatalogRepository> ChangeService<'s, R> {
    /// Creates a service over a caller-provided schema.
    pub fn with_schema(repo: R, schema: &'s CompositionSchema) -> Self {
        Self { repo, schema }
    }

    /// Validates `request`, resolves its root and reports changes inside
    /// `(since, until]`. `until` defaults to now.
    ///
    /// # Errors
    /// - `Validation` when a required key field is unset or blank.
    /// - `NotFound` when no root matches the key.
    /// - `Configuration` when the root kind has no schema entry.
    /// - `Repo` on storage failures.
    pub fn detect_change(
        &self,
        request: LookupRequest,
        since: NaiveDateTime,
        until: Option<NaiveDateTime>,
    ) -> Result<ChangeReport, CatalogError> {
        let result = self.run_query(request, ChangeWindow::with_optional_end(since, until));
        match &result {
            Ok(report) => info!(
                "event=change_query module=service status=ok changed={} categories={}",
                report.is_changed(),
                report.len()
            ),
            Err(err) => warn!(
                "event=change_query module=service status=error error_code={}",
                err.code()
            ),
        }
        result
    }

    pub fn has_organization_changed(
        &self,
        guid: Option<&str>,
        since: NaiveDateTime,
        until: Option<NaiveDateTime>,
    ) -> Result<ChangeReport, CatalogError> {
        self.detect_change(LookupRequest::organization(guid), since, until)
    }

    pub fn has_company_changed(
        &self,
        business_id: Option<&str>,
        since: NaiveDateTime,
        until: Option<NaiveDateTime>,
    ) -> Result<ChangeReport, CatalogError> {
        self.detect_change(LookupRequest::company(business_id), since, until)
    }

    pub fn has_member_changed(
        &self,
        x_road_instance: Option<&str>,
        member_class: Option<&str>,
        member_code: Option<&str>,
        since: NaiveDateTime,
        until: Option<NaiveDateTime>,
    ) -> Result<ChangeReport, CatalogError> {
        self.detect_change(
            LookupRequest::member(x_road_instance, member_class, member_code),
            since,
            until,
        )
    }

    /// Lists every root of `kind`, removed ones included, that changed inside
    /// the window. Ordered by business key.
    pub fn list_changed(
        &self,
        kind: EntityKind,
        since: NaiveDateTime,
        until: Option<NaiveDateTime>,
    ) -> Result<Vec<ChangedEntity>, CatalogError> {
        self.schema.ensure_root(kind)?;
        let window = ChangeWindow::with_optional_end(since, until);
        let scanner = ChangeScanner::new(self.schema);

        let mut changed = Vec::new();
        for root in self.repo.list_roots(kind, true)? {
            let Some(key) = root.key else {
                continue;
            };
            // Each root is re-read in its own snapshot.
            let Some(graph) = self.repo.load_graph(self.schema, &key, true)? else {
                continue;
            };
            let report = scanner.scan(&graph, &window)?;
            if report.is_changed() {
                changed.push(ChangedEntity { key, report });
            }
        }
        changed.sort_by(|left, right| left.key.cmp(&right.key));

        info!(
            "event=change_list module=service status=ok root_kind={kind} changed_roots={}",
            changed.len()
        );
        Ok(changed)
    }

    fn run_query(
        &self,
        request: LookupRequest,
        window: ChangeWindow,
    ) -> Result<ChangeReport, CatalogError> {
        let key = request.into_key()?;
        self.schema.ensure_root(key.root_kind())?;

        let graph = self
            .repo
            .load_graph(self.schema, &key, true)?
            .ok_or(CatalogError::NotFound(key))?;
        Ok(ChangeScanner::new(self.schema).scan(&graph, &window)?)
    }
}

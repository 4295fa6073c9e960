//! Depth-first change scan over a loaded entity graph.
//!
//! # Responsibility
//! - Walk every category the composition schema declares for the graph root.
//! - Report each category holding at least one record whose last event falls
//!   inside the window.
//!
//! # Invariants
//! - Removed records are evaluated like live ones; a removal is a change.
//! - A parent's outcome never gates its children; every declared level is
//!   visited while instances exist.
//! - The root's own metadata is reported under the root kind name.
//! - The scan never mutates the graph and performs no I/O.

use crate::model::graph::EntityGraph;
use crate::model::kind::EntityKind;
use crate::model::record::VersionedRecord;
use crate::scan::report::ChangeReport;
use crate::scan::window::ChangeWindow;
use crate::schema::{CompositionSchema, SchemaError};
use log::debug;
use std::time::Instant;

/// Scans entity graphs against one composition schema.
#[derive(Debug, Clone, Copy)]
pub struct ChangeScanner<'s> {
    schema: &'s CompositionSchema,
}

impl<'s> ChangeScanner<'s> {
    pub fn new(schema: &'s CompositionSchema) -> Self {
        Self { schema }
    }

    /// Computes the change report of `graph` inside `window`.
    ///
    /// # Errors
    /// - `SchemaError::UnknownRoot` when the graph root kind has no schema.
    pub fn scan(
        &self,
        graph: &EntityGraph,
        window: &ChangeWindow,
    ) -> Result<ChangeReport, SchemaError> {
        let started_at = Instant::now();
        let root = graph.root();
        self.schema.ensure_root(root.kind)?;

        let mut changed: Vec<&'static str> = Vec::new();
        if window.contains(root.last_event()) {
            changed.push(root.kind.as_str());
        }
        self.visit(graph, window, root.kind, &[root], &mut changed);

        debug!(
            "event=change_scan module=scan status=ok root_kind={} records={} categories={} duration_ms={}",
            root.kind,
            graph.record_count(),
            changed.len(),
            started_at.elapsed().as_millis()
        );
        Ok(ChangeReport::from_categories(changed))
    }

    fn visit(
        &self,
        graph: &EntityGraph,
        window: &ChangeWindow,
        kind: EntityKind,
        parents: &[&VersionedRecord],
        changed: &mut Vec<&'static str>,
    ) {
        for edge in self.schema.categories(kind) {
            let instances: Vec<&VersionedRecord> = parents
                .iter()
                .flat_map(|parent| edge.instances(graph, parent.id))
                .collect();
            if instances.is_empty() {
                continue;
            }

            let hit = instances
                .iter()
                .any(|record| window.contains(record.last_event()));
            if hit && !changed.contains(&edge.name()) {
                changed.push(edge.name());
            }

            self.visit(graph, window, edge.child, &instances, changed);
        }
    }
}

//! Loaded entity graph: one root record plus every attached sub-record.
//!
//! # Responsibility
//! - Hold a fully hydrated, immutable snapshot handed to change detection.
//! - Answer "which records of kind K hang under record P" without I/O.
//!
//! # Invariants
//! - The root is a valid root-kind record.
//! - Record ids are unique within one graph.
//! - Every attached record hangs under a record already in the graph.
//! - Sibling order is attachment order.

use crate::model::kind::EntityKind;
use crate::model::record::{RecordId, RecordValidationError, VersionedRecord};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors raised while assembling an entity graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The graph root must be an organization, company or member.
    NotARootKind(EntityKind),
    InvalidRecord(RecordValidationError),
    UnknownParent(RecordId),
    DuplicateRecord(RecordId),
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotARootKind(kind) => write!(f, "{kind} cannot be the root of an entity graph"),
            Self::InvalidRecord(err) => write!(f, "{err}"),
            Self::UnknownParent(id) => write!(f, "parent record {id} is not part of the graph"),
            Self::DuplicateRecord(id) => write!(f, "record {id} is already part of the graph"),
        }
    }
}

impl Error for GraphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRecord(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for GraphError {
    fn from(value: RecordValidationError) -> Self {
        Self::InvalidRecord(value)
    }
}

/// Immutable snapshot of one root entity and its nested records.
#[derive(Debug, Clone)]
pub struct EntityGraph {
    root: VersionedRecord,
    children: HashMap<(RecordId, EntityKind), Vec<VersionedRecord>>,
    ids: HashSet<RecordId>,
}

impl EntityGraph {
    /// Starts a graph from a root record.
    pub fn new(root: VersionedRecord) -> Result<Self, GraphError> {
        if !root.kind.is_root() {
            return Err(GraphError::NotARootKind(root.kind));
        }
        root.validate()?;

        let mut ids = HashSet::new();
        ids.insert(root.id);
        Ok(Self {
            root,
            children: HashMap::new(),
            ids,
        })
    }

    /// Attaches `record` under the record identified by `parent`.
    ///
    /// Returns the attached record id so callers can chain deeper levels.
    pub fn attach(
        &mut self,
        parent: RecordId,
        record: VersionedRecord,
    ) -> Result<RecordId, GraphError> {
        if !self.ids.contains(&parent) {
            return Err(GraphError::UnknownParent(parent));
        }
        if self.ids.contains(&record.id) {
            return Err(GraphError::DuplicateRecord(record.id));
        }
        record.validate()?;

        let id = record.id;
        self.ids.insert(id);
        self.children
            .entry((parent, record.kind))
            .or_default()
            .push(record);
        Ok(id)
    }

    pub fn root(&self) -> &VersionedRecord {
        &self.root
    }

    /// Records of `kind` attached directly under `parent`, removed ones included.
    pub fn instances(&self, parent: RecordId, kind: EntityKind) -> &[VersionedRecord] {
        self.children
            .get(&(parent, kind))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.ids.contains(&id)
    }

    /// Number of records in the graph, root included.
    pub fn record_count(&self) -> usize {
        self.ids.len()
    }
}

//! Versioned record model shared by every catalog entity kind.
//!
//! # Responsibility
//! - Hold identity, kind, temporal metadata and plain domain fields of one
//!   record.
//! - Carry the business key used for external lookup on root records.
//!
//! # Invariants
//! - `id` is stable, non-nil and never reused for another record.
//! - A record carries a business key iff its kind is a root kind, and the key
//!   addresses that same kind.
//! - Temporal metadata obeys the `StatusInfo` ordering rules.

use crate::model::kind::EntityKind;
use crate::model::status::StatusInfo;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one stored record.
pub type RecordId = Uuid;

/// Natural key addressing one root record from outside the catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessKey {
    OrganizationGuid(String),
    CompanyBusinessId(String),
    Member {
        x_road_instance: String,
        member_class: String,
        member_code: String,
    },
}

impl BusinessKey {
    /// Root kind addressed by this key.
    pub fn root_kind(&self) -> EntityKind {
        match self {
            Self::OrganizationGuid(_) => EntityKind::Organization,
            Self::CompanyBusinessId(_) => EntityKind::Company,
            Self::Member { .. } => EntityKind::Member,
        }
    }
}

impl Display for BusinessKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrganizationGuid(guid) => write!(f, "guid={guid}"),
            Self::CompanyBusinessId(business_id) => write!(f, "business_id={business_id}"),
            Self::Member {
                x_road_instance,
                member_class,
                member_code,
            } => write!(f, "member={x_road_instance}/{member_class}/{member_code}"),
        }
    }
}

/// Record shape violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    NilId,
    ChangedBeforeCreated(RecordId),
    RemovedBeforeChanged(RecordId),
    MissingBusinessKey(RecordId),
    UnexpectedBusinessKey(RecordId),
    KeyKindMismatch {
        id: RecordId,
        kind: EntityKind,
        key_kind: EntityKind,
    },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "record id must not be nil"),
            Self::ChangedBeforeCreated(id) => {
                write!(f, "record {id} has changed timestamp before created")
            }
            Self::RemovedBeforeChanged(id) => {
                write!(f, "record {id} has removed timestamp before changed")
            }
            Self::MissingBusinessKey(id) => write!(f, "root record {id} has no business key"),
            Self::UnexpectedBusinessKey(id) => {
                write!(f, "nested record {id} must not carry a business key")
            }
            Self::KeyKindMismatch { id, kind, key_kind } => write!(
                f,
                "record {id} of kind {kind} carries a business key for {key_kind}"
            ),
        }
    }
}

impl Error for RecordValidationError {}

/// One versioned catalog record: temporal metadata plus domain fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedRecord {
    pub id: RecordId,
    pub kind: EntityKind,
    /// Present on root kinds only.
    pub key: Option<BusinessKey>,
    pub status: StatusInfo,
    /// Plain domain values by field name, e.g. `email` or `street_number`.
    pub fields: BTreeMap<String, String>,
}

impl VersionedRecord {
    /// Creates a nested record with a generated id.
    pub fn new(kind: EntityKind, status: StatusInfo) -> Self {
        Self::with_id(Uuid::new_v4(), kind, status)
    }

    /// Creates a root record addressed by `key`.
    pub fn root(key: BusinessKey, status: StatusInfo) -> Self {
        let mut record = Self::new(key.root_kind(), status);
        record.key = Some(key);
        record
    }

    /// Creates a record with a caller-provided id, as used by storage reads.
    pub fn with_id(id: RecordId, kind: EntityKind, status: StatusInfo) -> Self {
        Self {
            id,
            kind,
            key: None,
            status,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn last_event(&self) -> NaiveDateTime {
        self.status.last_event()
    }

    pub fn is_removed(&self) -> bool {
        self.status.is_removed()
    }

    /// Checks the record invariants listed in the module docs.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.id.is_nil() {
            return Err(RecordValidationError::NilId);
        }
        if self.status.changed < self.status.created {
            return Err(RecordValidationError::ChangedBeforeCreated(self.id));
        }
        if let Some(removed) = self.status.removed {
            if removed < self.status.changed {
                return Err(RecordValidationError::RemovedBeforeChanged(self.id));
            }
        }

        match (&self.key, self.kind.is_root()) {
            (None, true) => Err(RecordValidationError::MissingBusinessKey(self.id)),
            (Some(_), false) => Err(RecordValidationError::UnexpectedBusinessKey(self.id)),
            (Some(key), true) if key.root_kind() != self.kind => {
                Err(RecordValidationError::KeyKindMismatch {
                    id: self.id,
                    kind: self.kind,
                    key_kind: key.root_kind(),
                })
            }
            _ => Ok(()),
        }
    }
}

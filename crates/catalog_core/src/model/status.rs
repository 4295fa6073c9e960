//! Temporal metadata attached to every versioned catalog record.
//!
//! # Responsibility
//! - Carry the created/changed/removed/fetched history of one record.
//! - Define `last_event`, the single timestamp change detection looks at.
//!
//! # Invariants
//! - `created <= changed`.
//! - `removed`, when present, is the latest event of the record.
//! - Records are never physically deleted; `removed` is the tombstone.
//! - `fetched` is collector bookkeeping and is never a change event.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Versioning timestamps of one catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    /// First time the record was stored.
    pub created: NaiveDateTime,
    /// Last time any field of the record was modified.
    pub changed: NaiveDateTime,
    /// Logical deletion time. `None` means the record is live.
    pub removed: Option<NaiveDateTime>,
    /// Last time the collector saw the record in its source.
    pub fetched: NaiveDateTime,
}

impl StatusInfo {
    /// Status for a record first stored at `now`.
    pub fn new_at(now: NaiveDateTime) -> Self {
        Self {
            created: now,
            changed: now,
            removed: None,
            fetched: now,
        }
    }

    /// Status with explicit history, used when loading stored records.
    pub fn with_history(
        created: NaiveDateTime,
        changed: NaiveDateTime,
        removed: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            created,
            changed,
            removed,
            fetched: changed,
        }
    }

    /// Latest of `created`, `changed` and `removed`.
    pub fn last_event(&self) -> NaiveDateTime {
        let latest = self.created.max(self.changed);
        match self.removed {
            Some(removed) => latest.max(removed),
            None => latest,
        }
    }

    pub fn is_removed(&self) -> bool {
        self.removed.is_some()
    }

    /// Records a field modification. A modification revives a removed record.
    pub fn mark_changed(&mut self, now: NaiveDateTime) {
        self.changed = now;
        self.fetched = now;
        self.removed = None;
    }

    /// Tombstones the record. Re-removing keeps the original removal time.
    pub fn mark_removed(&mut self, now: NaiveDateTime) {
        if self.removed.is_none() {
            self.removed = Some(now);
        }
    }

    pub fn mark_fetched(&mut self, now: NaiveDateTime) {
        self.fetched = now;
    }
}

//! Time window a change query is evaluated against.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Half-open window `(since, until]`.
///
/// The start is excluded so a query starting at the previous query's `until`
/// never reports the boundary event twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeWindow {
    since: NaiveDateTime,
    until: NaiveDateTime,
}

impl ChangeWindow {
    /// Window with explicit bounds. `since >= until` is accepted and matches
    /// nothing.
    pub fn new(since: NaiveDateTime, until: NaiveDateTime) -> Self {
        Self { since, until }
    }

    /// Window from `since` up to the current local time.
    pub fn until_now(since: NaiveDateTime) -> Self {
        Self::new(since, Local::now().naive_local())
    }

    /// Window whose end defaults to now when the caller leaves it unset.
    pub fn with_optional_end(since: NaiveDateTime, until: Option<NaiveDateTime>) -> Self {
        match until {
            Some(until) => Self::new(since, until),
            None => Self::until_now(since),
        }
    }

    pub fn since(&self) -> NaiveDateTime {
        self.since
    }

    pub fn until(&self) -> NaiveDateTime {
        self.until
    }

    /// `since < instant <= until`.
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.since < instant && instant <= self.until
    }

    /// True when no instant can fall inside the window.
    pub fn is_empty(&self) -> bool {
        self.since >= self.until
    }
}

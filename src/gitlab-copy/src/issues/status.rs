//! Issue migration outcomes.

use serde::Serialize;

/// Result of a successful [`migrate_issue`][super::migrate_issue] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IssueOutcome {
    /// The issue now exists on the destination.
    Migrated {
        /// Display number on the destination.
        destination_iid: u64,
        /// Number of notes copied.
        notes: usize,
    },

    /// An issue with the same title already exists on the destination.
    SkippedDuplicate {
        /// Display number of the existing destination issue.
        existing_iid: u64,
    },
}

impl IssueOutcome {
    /// Returns true if the issue was copied by this run.
    #[must_use]
    pub fn is_migrated(&self) -> bool {
        matches!(self, Self::Migrated { .. })
    }
}

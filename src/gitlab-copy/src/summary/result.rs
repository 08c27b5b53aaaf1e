//! Processing result types.

use serde::Serialize;

/// What happened to the source issue after a successful copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceRemoval {
    /// Move mode is off.
    Kept,
    /// The source issue was deleted.
    Deleted,
    /// Deletion was attempted and failed.
    Failed {
        /// Error message.
        error: String,
    },
}

/// Result of processing a single source issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ProcessingResult {
    /// The issue was copied.
    Migrated {
        /// Source display number.
        iid: u64,
        /// Destination display number.
        destination_iid: u64,
        /// Number of notes copied.
        notes: usize,
        /// Move mode outcome.
        removal: SourceRemoval,
    },

    /// The issue was skipped.
    Skipped {
        /// Source display number.
        iid: u64,
        /// Reason for skipping.
        reason: String,
    },

    /// The issue could not be copied.
    Failed {
        /// Source display number.
        iid: u64,
        /// Error message.
        error: String,
    },
}

impl ProcessingResult {
    /// Source display number of the processed issue.
    #[must_use]
    pub fn iid(&self) -> u64 {
        match self {
            Self::Migrated { iid, .. } | Self::Skipped { iid, .. } | Self::Failed { iid, .. } => {
                *iid
            }
        }
    }
}

//! Run summary types.

use super::result::{ProcessingResult, SourceRemoval};
use crate::config::RunMode;

/// Summary of a complete run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// What the run was configured to do.
    pub mode: RunMode,

    /// Number of labels created on the destination.
    pub labels_created: usize,

    /// Number of milestones created in bulk (milestones-only mode).
    pub milestones_created: usize,

    /// Number of source issues in scope.
    pub issues_processed: usize,

    /// Number of issues copied.
    pub issues_migrated: usize,

    /// Number of issues skipped (e.g., duplicates).
    pub issues_skipped: usize,

    /// Number of issues that failed to copy.
    pub issues_failed: usize,

    /// Number of notes copied.
    pub notes_copied: usize,

    /// Number of source issues deleted in move mode.
    pub sources_deleted: usize,

    /// Number of source issues that could not be deleted.
    pub delete_failures: usize,

    /// Per-issue results in processing order.
    pub results: Vec<ProcessingResult>,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            labels_created: 0,
            milestones_created: 0,
            issues_processed: 0,
            issues_migrated: 0,
            issues_skipped: 0,
            issues_failed: 0,
            notes_copied: 0,
            sources_deleted: 0,
            delete_failures: 0,
            results: Vec::new(),
        }
    }

    /// Updates the summary with a processing result.
    pub fn record_result(&mut self, result: ProcessingResult) {
        self.issues_processed += 1;
        match &result {
            ProcessingResult::Migrated { notes, removal, .. } => {
                self.issues_migrated += 1;
                self.notes_copied += notes;
                match removal {
                    SourceRemoval::Kept => {}
                    SourceRemoval::Deleted => self.sources_deleted += 1,
                    SourceRemoval::Failed { .. } => self.delete_failures += 1,
                }
            }
            ProcessingResult::Skipped { .. } => self.issues_skipped += 1,
            ProcessingResult::Failed { .. } => self.issues_failed += 1,
        }
        self.results.push(result);
    }

    /// Returns true if any issue failed to migrate.
    ///
    /// Failed source deletions in move mode are only counted in
    /// `delete_failures`; the issue itself was migrated.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.issues_failed > 0
    }

    /// Returns true if every processed issue was copied or skipped cleanly.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures()
    }

    /// Display numbers of processed issues, in processing order.
    #[must_use]
    pub fn processed_iids(&self) -> Vec<u64> {
        self.results.iter().map(ProcessingResult::iid).collect()
    }
}

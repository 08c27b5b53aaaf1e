//! Issue migration error types.

use crate::gitlab::ApiError;
use crate::milestones::MilestoneError;
use crate::templates::TemplateError;
use thiserror::Error;

/// Errors that stop the migration of a single issue.
///
/// None of these abort the run; the orchestrator records them and moves on
/// to the next issue.
#[derive(Debug, Error)]
pub enum IssueError {
    /// The source issue could not be read.
    #[error("failed to fetch source issue #{iid}: {source}")]
    Fetch {
        iid: u64,
        #[source]
        source: ApiError,
    },

    /// Destination issues could not be listed for the duplicate check.
    #[error("failed to list destination issues: {0}")]
    ListDestinationIssues(#[source] ApiError),

    /// Destination users could not be listed to resolve the assignee.
    #[error("failed to list destination users: {0}")]
    ListUsers(#[source] ApiError),

    /// The milestone could not be found or created.
    #[error(transparent)]
    Milestone(#[from] MilestoneError),

    /// The destination issue could not be created.
    #[error("failed to create issue '{title}': {source}")]
    Create {
        title: String,
        #[source]
        source: ApiError,
    },

    /// The issue was rejected as too large and has no description to shorten.
    #[error("issue '{title}' is too large and has no description to truncate: {source}")]
    TooLargeWithoutDescription {
        title: String,
        #[source]
        source: ApiError,
    },

    /// Source notes could not be listed.
    #[error("failed to list notes of issue #{iid}: {source}")]
    ListNotes {
        iid: u64,
        #[source]
        source: ApiError,
    },

    /// A note could not be copied.
    #[error("failed to copy note {note_id}: {source}")]
    CreateNote {
        note_id: u64,
        #[source]
        source: ApiError,
    },

    /// The destination issue could not be closed.
    #[error("failed to close destination issue #{iid}: {source}")]
    CloseDestination {
        iid: u64,
        #[source]
        source: ApiError,
    },

    /// The link note text could not be rendered.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The link note could not be added to the source issue.
    #[error("failed to add link note to source issue #{iid}: {source}")]
    LinkNote {
        iid: u64,
        #[source]
        source: ApiError,
    },

    /// The source issue could not be closed.
    #[error("failed to close source issue #{iid}: {source}")]
    CloseSource {
        iid: u64,
        #[source]
        source: ApiError,
    },
}

//! Runner error types.

use crate::gitlab::ApiError;
use crate::labels::LabelError;
use crate::milestones::MilestoneError;

/// Errors that abort a run.
///
/// Per-issue failures are not among them; they are recorded in the
/// [`RunSummary`][crate::summary::RunSummary].
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// A GitLab client could not be created.
    #[error("failed to create {side} client: {source}")]
    Client {
        side: &'static str,
        #[source]
        source: ApiError,
    },

    /// A configured project does not exist.
    #[error("{side} project '{name}' not found")]
    ProjectNotFound { side: &'static str, name: String },

    /// A configured project could not be looked up.
    #[error("failed to look up {side} project '{name}': {source}")]
    ProjectLookup {
        side: &'static str,
        name: String,
        #[source]
        source: ApiError,
    },

    /// Label replication failed.
    #[error(transparent)]
    Labels(#[from] LabelError),

    /// Bulk milestone replication failed.
    #[error(transparent)]
    Milestones(#[from] MilestoneError),

    /// Source issues could not be listed.
    #[error("failed to list source issues: {0}")]
    ListIssues(#[source] ApiError),

    /// A user token could not be checked.
    #[error("failed to check token of user '{username}': {source}")]
    UserToken {
        username: String,
        #[source]
        source: ApiError,
    },

    /// A user token belongs to someone else.
    #[error("token configured for user '{username}' belongs to '{actual}'")]
    UserTokenMismatch { username: String, actual: String },

    /// Source statistics could not be computed.
    #[error("failed to compute source statistics: {0}")]
    Stats(#[source] ApiError),
}

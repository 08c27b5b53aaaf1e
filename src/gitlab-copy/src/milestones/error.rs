//! Milestone error types.

use crate::gitlab::ApiError;
use thiserror::Error;

/// Errors raised while replicating or resolving milestones.
#[derive(Debug, Error)]
pub enum MilestoneError {
    /// Milestones could not be listed.
    #[error("failed to list milestones: {0}")]
    List(#[source] ApiError),

    /// Destination milestones could not be searched for an issue's milestone.
    #[error("failed to look up milestone '{title}': {source}")]
    Resolve {
        title: String,
        #[source]
        source: ApiError,
    },

    /// A destination milestone could not be created.
    #[error("failed to create milestone '{title}': {source}")]
    Create {
        title: String,
        #[source]
        source: ApiError,
    },

    /// A freshly created milestone could not be closed.
    #[error("failed to close milestone '{title}': {source}")]
    Close {
        title: String,
        #[source]
        source: ApiError,
    },
}

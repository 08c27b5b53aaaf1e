//! Label replication error types.

use crate::gitlab::ApiError;
use thiserror::Error;

/// Errors that abort label replication.
#[derive(Debug, Error)]
pub enum LabelError {
    /// Source labels could not be listed.
    #[error("failed to list source labels: {0}")]
    List(#[source] ApiError),

    /// A destination label could not be created.
    #[error("failed to create label '{name}': {source}")]
    Create {
        name: String,
        #[source]
        source: ApiError,
    },
}

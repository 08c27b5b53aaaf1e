//! Configuration loading.
//!
//! This module parses the YAML document describing the source (`from`) and
//! destination (`to`) projects and validates it into a read-only [`Config`].

mod error;
mod project;
pub mod range;

pub use error::ConfigError;
pub use project::{IssueToken, ProjectConfig, API_PATH, DEFAULT_LINK_TEXT};
pub use range::{IssueRange, IssueRanges, RangeError};

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Validated migration configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Project issues are read from.
    #[serde(rename = "from")]
    pub source: ProjectConfig,

    /// Project issues are written to.
    #[serde(rename = "to")]
    pub destination: ProjectConfig,
}

/// What a run does once labels are copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Stop after copying labels.
    LabelsOnly,
    /// Copy all milestones and stop.
    MilestonesOnly,
    /// Copy (or move) issues.
    Issues,
}

impl Config {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not valid YAML,
    /// or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!(path = %path.display(), "Loading configuration");

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses and validates a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config =
            serde_yaml::from_str(content).map_err(|e| ConfigError::YamlError { source: e })?;

        config.source.validate("source")?;
        config.destination.validate("destination")?;
        config.source.parse_issues()?;

        if config.source.link_to_target_issue_text.trim().is_empty() {
            config.source.link_to_target_issue_text = DEFAULT_LINK_TEXT.to_string();
        }

        debug!(
            source = %config.source.name,
            destination = %config.destination.name,
            users = config.destination.users.len(),
            "Configuration validated"
        );
        Ok(config)
    }

    /// Returns the effective run mode.
    ///
    /// Labels-only takes precedence over milestones-only.
    #[must_use]
    pub fn mode(&self) -> RunMode {
        if self.source.labels_only {
            RunMode::LabelsOnly
        } else if self.source.milestones_only {
            RunMode::MilestonesOnly
        } else {
            RunMode::Issues
        }
    }
}

#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod config;
pub mod gitlab;
pub mod issues;
pub mod labels;
pub mod milestones;
pub mod pagination;
pub mod rate_limit;
pub mod runner;
pub mod stats;
pub mod summary;
pub mod templates;

pub use config::{Config, ConfigError, IssueRange, IssueRanges, ProjectConfig, RangeError, RunMode};
pub use gitlab::{ApiError, GitLabApi, GitLabClient, GitLabClientBuilder, Project};
pub use issues::{migrate_issue, IssueError, IssueOptions, IssueOutcome, MigrationContext};
pub use labels::{replicate_labels, LabelError};
pub use milestones::{replicate_milestones, resolve_milestone, MilestoneError};
pub use runner::{Endpoints, Runner, RunnerError};
pub use stats::ProjectStats;
pub use summary::{ProcessingResult, RunSummary, SourceRemoval};
pub use templates::{LinkRenderer, TemplateError};

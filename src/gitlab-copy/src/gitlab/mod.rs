//! GitLab API access.
//!
//! The migration engine only talks to GitLab through the [`GitLabApi`]
//! trait. [`GitLabClient`] implements it over the REST API v4; tests use an
//! in-memory double.

mod client;
mod error;
#[cfg(test)]
pub(crate) mod fake;
mod types;

pub use client::{GitLabClient, GitLabClientBuilder};
pub use error::ApiError;
pub use types::{
    truncate_chars, Issue, Label, Milestone, NewIssue, NewLabel, NewMilestone, Note, Project,
    ProjectId, StateEvent, User,
};

use crate::pagination::PageRequest;
use async_trait::async_trait;
use url::Url;

/// Operations the migration needs from a GitLab server.
///
/// Per-issue operations take the project-local display number (`iid`), which
/// is how the REST API addresses issues. Listing operations return an empty
/// vector past the last page.
#[async_trait]
pub trait GitLabApi: Send + Sync {
    /// Base URL of the API (including `/api/v4`).
    fn base_url(&self) -> &Url;

    /// The user owning the token.
    async fn current_user(&self) -> Result<User, ApiError>;

    /// Looks up a project by numeric id or `namespace/path`.
    async fn get_project(&self, name: &str) -> Result<Project, ApiError>;

    async fn list_labels(&self, project: ProjectId, page: PageRequest)
        -> Result<Vec<Label>, ApiError>;

    /// Fails with [`ApiError::Conflict`] when the label already exists.
    async fn create_label(&self, project: ProjectId, label: &NewLabel) -> Result<Label, ApiError>;

    async fn list_milestones(
        &self,
        project: ProjectId,
        page: PageRequest,
    ) -> Result<Vec<Milestone>, ApiError>;

    async fn create_milestone(
        &self,
        project: ProjectId,
        milestone: &NewMilestone,
    ) -> Result<Milestone, ApiError>;

    async fn update_milestone_state(
        &self,
        project: ProjectId,
        milestone_id: u64,
        event: StateEvent,
    ) -> Result<Milestone, ApiError>;

    /// Lists issues in ascending creation order.
    async fn list_issues(&self, project: ProjectId, page: PageRequest)
        -> Result<Vec<Issue>, ApiError>;

    async fn get_issue(&self, project: ProjectId, iid: u64) -> Result<Issue, ApiError>;

    /// Fails with [`ApiError::TooLarge`] when the payload is rejected for size.
    async fn create_issue(&self, project: ProjectId, issue: &NewIssue) -> Result<Issue, ApiError>;

    /// Applies a state event and sets the label list.
    async fn update_issue_state(
        &self,
        project: ProjectId,
        iid: u64,
        event: StateEvent,
        labels: &[String],
    ) -> Result<Issue, ApiError>;

    async fn delete_issue(&self, project: ProjectId, iid: u64) -> Result<(), ApiError>;

    /// Lists users of a project.
    async fn list_users(&self, project: ProjectId, page: PageRequest)
        -> Result<Vec<User>, ApiError>;

    /// Lists notes of an issue, newest first.
    async fn list_issue_notes(
        &self,
        project: ProjectId,
        iid: u64,
        page: PageRequest,
    ) -> Result<Vec<Note>, ApiError>;

    /// Fails with [`ApiError::TooLarge`] when the body is rejected for size.
    async fn create_issue_note(
        &self,
        project: ProjectId,
        iid: u64,
        body: &str,
    ) -> Result<Note, ApiError>;
}

/// Returns true when both URLs point at the same server (host and port).
#[must_use]
pub fn same_server(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}

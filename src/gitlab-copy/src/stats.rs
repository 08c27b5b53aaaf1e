//! Read-only project statistics shown before a migration is applied.

use crate::gitlab::{ApiError, GitLabApi, ProjectId};
use crate::pagination::{collect_all, walk, RESULTS_PER_PAGE};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::ControlFlow;
use tracing::debug;

/// Issue, milestone, label and note counts of one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectStats {
    /// Total number of issues.
    pub issues: usize,
    /// Number of open issues.
    pub opened: usize,
    /// Number of closed issues.
    pub closed: usize,
    /// Number of notes across all issues. Only set by
    /// [`count_notes`][ProjectStats::count_notes].
    pub notes: usize,
    /// Milestone titles referenced by issues, with their issue count.
    pub milestones: BTreeMap<String, usize>,
    /// Label names defined in the project.
    pub labels: BTreeMap<String, usize>,
}

impl ProjectStats {
    /// Counts issues by state, the milestones they use, and project labels.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if an issue or label page cannot be fetched.
    pub async fn compute(client: &dyn GitLabApi, project: ProjectId) -> Result<Self, ApiError> {
        let mut stats = Self::default();

        walk(
            RESULTS_PER_PAGE,
            |page| client.list_issues(project, page),
            |issues| {
                stats.issues += issues.len();
                for issue in &issues {
                    match issue.state.as_str() {
                        "opened" => stats.opened += 1,
                        "closed" => stats.closed += 1,
                        _ => {}
                    }
                    if let Some(milestone) = issue.milestone_with_title() {
                        *stats.milestones.entry(milestone.title.clone()).or_default() += 1;
                    }
                }
                Ok(ControlFlow::Continue(()))
            },
        )
        .await?;

        let labels = collect_all(RESULTS_PER_PAGE, |page| client.list_labels(project, page)).await?;
        for label in labels {
            *stats.labels.entry(label.name).or_default() += 1;
        }

        debug!(issues = stats.issues, labels = stats.labels.len(), "Statistics computed");
        Ok(stats)
    }

    /// Counts the notes of every issue.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if an issue or note page cannot be fetched.
    pub async fn count_notes(
        &mut self,
        client: &dyn GitLabApi,
        project: ProjectId,
    ) -> Result<(), ApiError> {
        let issues = collect_all(RESULTS_PER_PAGE, |page| client.list_issues(project, page)).await?;

        let mut notes = 0;
        for issue in &issues {
            let iid = issue.iid;
            notes += collect_all(RESULTS_PER_PAGE, |page| {
                client.list_issue_notes(project, iid, page)
            })
            .await?
            .len();
        }

        self.notes = notes;
        Ok(())
    }
}

impl fmt::Display for ProjectStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} issues ({} opened, {} closed)",
            self.issues, self.opened, self.closed
        )
    }
}

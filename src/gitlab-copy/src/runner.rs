//! Orchestrates a migration run.

mod endpoints;
mod error;

pub use endpoints::Endpoints;
pub use error::RunnerError;

use crate::config::{Config, RunMode};
use crate::gitlab::{GitLabApi, Project, ProjectId};
use crate::issues::{migrate_issue, IssueOptions, IssueOutcome, MigrationContext};
use crate::labels::replicate_labels;
use crate::milestones::replicate_milestones;
use crate::pagination::{walk, RESULTS_PER_PAGE};
use crate::stats::ProjectStats;
use crate::summary::{ProcessingResult, RunSummary, SourceRemoval};
use crate::templates::LinkRenderer;
use std::ops::ControlFlow;
use tracing::{debug, error, info, warn};

/// Copies labels, milestones and issues from the source project to the
/// destination project.
pub struct Runner {
    config: Config,
    endpoints: Endpoints,
    renderer: LinkRenderer,
}

impl Runner {
    /// Builds a runner with REST clients for every configured token.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `insecure` - Skip TLS certificate verification
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Client`] if a client cannot be built.
    pub fn new(config: Config, insecure: bool) -> Result<Self, RunnerError> {
        let endpoints = Endpoints::connect(&config, insecure)?;
        Ok(Self::with_endpoints(config, endpoints))
    }

    /// Builds a runner over existing clients.
    #[must_use]
    pub fn with_endpoints(config: Config, endpoints: Endpoints) -> Self {
        Self {
            config,
            endpoints,
            renderer: LinkRenderer::new(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Verifies that every configured user token belongs to its user.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::UserToken`] if a token cannot be used and
    /// [`RunnerError::UserTokenMismatch`] if it belongs to someone else.
    pub async fn check_user_tokens(&self) -> Result<(), RunnerError> {
        for (username, client) in &self.endpoints.users {
            let user = client
                .current_user()
                .await
                .map_err(|e| RunnerError::UserToken {
                    username: username.clone(),
                    source: e,
                })?;

            if &user.username != username {
                return Err(RunnerError::UserTokenMismatch {
                    username: username.clone(),
                    actual: user.username,
                });
            }
            debug!(username = %username, "User token checked");
        }
        Ok(())
    }

    /// Looks up the source and destination projects, each on its own server.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::ProjectNotFound`] for unknown projects and
    /// [`RunnerError::ProjectLookup`] for any other failure.
    pub async fn resolve_projects(&self) -> Result<(Project, Project), RunnerError> {
        let source = resolve_project(
            "source",
            self.endpoints.source.as_ref(),
            &self.config.source.name,
        )
        .await?;
        let destination = resolve_project(
            "destination",
            self.endpoints.destination.as_ref(),
            &self.config.destination.name,
        )
        .await?;
        Ok((source, destination))
    }

    /// Computes statistics of the source project.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Stats`] if a listing fails.
    pub async fn source_stats(
        &self,
        project: &Project,
        count_notes: bool,
    ) -> Result<ProjectStats, RunnerError> {
        let client = self.endpoints.source.as_ref();
        let mut stats = ProjectStats::compute(client, project.id)
            .await
            .map_err(RunnerError::Stats)?;
        if count_notes {
            stats
                .count_notes(client, project.id)
                .await
                .map_err(RunnerError::Stats)?;
        }
        Ok(stats)
    }

    /// Executes the migration.
    ///
    /// Labels are always copied first. Depending on the configured
    /// [`RunMode`] the run then stops, copies all milestones, or copies the
    /// in-scope issues in ascending display-number order.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if project lookup, label or milestone
    /// replication, or issue listing fails. Failures of individual issues
    /// are recorded in the summary instead.
    pub async fn run(&self) -> Result<RunSummary, RunnerError> {
        let mode = self.config.mode();
        let mut summary = RunSummary::new(mode);

        let (source_project, destination_project) = self.resolve_projects().await?;
        let source = self.endpoints.source.as_ref();
        let destination = self.endpoints.destination.as_ref();

        info!(
            source = %source_project.path_with_namespace,
            destination = %destination_project.path_with_namespace,
            "Copying labels"
        );
        summary.labels_created =
            replicate_labels(source, destination, source_project.id, destination_project.id)
                .await?;
        info!(created = summary.labels_created, "Labels copied");

        match mode {
            RunMode::LabelsOnly => return Ok(summary),
            RunMode::MilestonesOnly => {
                summary.milestones_created = replicate_milestones(
                    source,
                    destination,
                    source_project.id,
                    destination_project.id,
                )
                .await?;
                info!(created = summary.milestones_created, "Milestones copied");
                return Ok(summary);
            }
            RunMode::Issues => {}
        }

        let issues = list_issue_numbers(source, source_project.id).await?;
        info!(count = issues.len(), "Found source issues");

        let options = IssueOptions::from(&self.config.source);
        let ctx = MigrationContext {
            source,
            destination,
            user_clients: &self.endpoints.users,
            source_project: &source_project,
            destination_project: &destination_project,
            options: &options,
            renderer: &self.renderer,
        };

        for (iid, id) in issues {
            if !self.config.source.matches(iid) {
                continue;
            }
            debug!(iid, id, "Processing issue");
            let result = self.process_issue(&ctx, iid).await;
            summary.record_result(result);
        }

        info!(
            migrated = summary.issues_migrated,
            skipped = summary.issues_skipped,
            failed = summary.issues_failed,
            "Issues processed"
        );
        Ok(summary)
    }

    async fn process_issue(&self, ctx: &MigrationContext<'_>, iid: u64) -> ProcessingResult {
        match migrate_issue(ctx, iid).await {
            Ok(IssueOutcome::Migrated {
                destination_iid,
                notes,
            }) => {
                let removal = if self.config.source.move_issues {
                    delete_source_issue(ctx.source, ctx.source_project.id, iid).await
                } else {
                    SourceRemoval::Kept
                };
                ProcessingResult::Migrated {
                    iid,
                    destination_iid,
                    notes,
                    removal,
                }
            }
            Ok(IssueOutcome::SkippedDuplicate { existing_iid }) => ProcessingResult::Skipped {
                iid,
                reason: format!("duplicate of destination issue #{existing_iid}"),
            },
            Err(e) => {
                error!(iid, error = %e, "Failed to migrate issue");
                ProcessingResult::Failed {
                    iid,
                    error: e.to_string(),
                }
            }
        }
    }
}

async fn resolve_project(
    side: &'static str,
    client: &dyn GitLabApi,
    name: &str,
) -> Result<Project, RunnerError> {
    match client.get_project(name).await {
        Ok(project) => {
            debug!(side, project = %project.path_with_namespace, id = project.id, "Project found");
            Ok(project)
        }
        Err(e) if e.is_not_found() => Err(RunnerError::ProjectNotFound {
            side,
            name: name.to_string(),
        }),
        Err(e) => Err(RunnerError::ProjectLookup {
            side,
            name: name.to_string(),
            source: e,
        }),
    }
}

/// `(iid, id)` of every source issue, sorted by display number.
async fn list_issue_numbers(
    client: &dyn GitLabApi,
    project: ProjectId,
) -> Result<Vec<(u64, u64)>, RunnerError> {
    let mut issues = Vec::new();
    walk(
        RESULTS_PER_PAGE,
        |page| client.list_issues(project, page),
        |page| {
            issues.extend(page.iter().map(|issue| (issue.iid, issue.id)));
            Ok(ControlFlow::Continue(()))
        },
    )
    .await
    .map_err(RunnerError::ListIssues)?;

    issues.sort_unstable_by_key(|&(iid, _)| iid);
    Ok(issues)
}

async fn delete_source_issue(client: &dyn GitLabApi, project: ProjectId, iid: u64) -> SourceRemoval {
    match client.delete_issue(project, iid).await {
        Ok(()) => {
            info!(iid, "Source issue deleted");
            SourceRemoval::Deleted
        }
        Err(e) => {
            warn!(iid, error = %e, "Failed to delete source issue");
            SourceRemoval::Failed {
                error: e.to_string(),
            }
        }
    }
}

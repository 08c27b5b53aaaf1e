//! Migration of individual issues.
//!
//! [`migrate_issue`] copies one source issue to the destination project:
//! duplicate check, assignee and milestone resolution, creation, notes,
//! closed state, then the optional link note and source close.

mod error;
mod notes;
mod status;

pub use error::IssueError;
pub use status::IssueOutcome;

use crate::config::ProjectConfig;
use crate::gitlab::{same_server, GitLabApi, Issue, NewIssue, Project, StateEvent};
use crate::milestones::resolve_milestone;
use crate::pagination::{walk, RESULTS_PER_PAGE};
use crate::templates::LinkRenderer;
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

/// Length descriptions and notes are cut to when GitLab rejects them as too
/// large.
pub const TRUNCATED_TEXT_CHARS: usize = 1024;

/// Per-issue behaviour taken from the source configuration block.
#[derive(Debug, Clone, Default)]
pub struct IssueOptions {
    /// Close the source issue once copied.
    pub auto_close: bool,
    /// Link note template; no note is added when `None`.
    pub link_text: Option<String>,
}

impl From<&ProjectConfig> for IssueOptions {
    fn from(config: &ProjectConfig) -> Self {
        Self {
            auto_close: config.auto_close_issues,
            link_text: config
                .link_to_target_issue
                .then(|| config.link_to_target_issue_text.clone()),
        }
    }
}

/// Everything [`migrate_issue`] needs, borrowed from the runner.
pub struct MigrationContext<'a> {
    pub source: &'a dyn GitLabApi,
    pub destination: &'a dyn GitLabApi,
    /// Destination clients keyed by username, used to post notes as their
    /// author.
    pub user_clients: &'a BTreeMap<String, Arc<dyn GitLabApi>>,
    pub source_project: &'a Project,
    pub destination_project: &'a Project,
    pub options: &'a IssueOptions,
    pub renderer: &'a LinkRenderer,
}

/// Copies source issue `iid` to the destination project.
///
/// # Returns
///
/// [`IssueOutcome::SkippedDuplicate`] when the destination already has an
/// issue with the same title, [`IssueOutcome::Migrated`] otherwise.
///
/// # Errors
///
/// Returns [`IssueError`] naming the step that failed. Work done before the
/// failure (such as a created destination issue) is not rolled back.
pub async fn migrate_issue(
    ctx: &MigrationContext<'_>,
    iid: u64,
) -> Result<IssueOutcome, IssueError> {
    let span = info_span!("migrate_issue", iid);

    async {
        let source_project = ctx.source_project.id;
        let destination_project = ctx.destination_project.id;

        let issue = ctx
            .source
            .get_issue(source_project, iid)
            .await
            .map_err(|e| IssueError::Fetch { iid, source: e })?;

        if let Some(existing) = find_by_title(ctx, &issue.title).await? {
            info!(
                title = %issue.title,
                existing_iid = existing,
                "Duplicate issue exists, skipping"
            );
            return Ok(IssueOutcome::SkippedDuplicate {
                existing_iid: existing,
            });
        }

        let request = build_request(ctx, &issue).await?;
        let created = create_destination_issue(ctx, &request).await?;
        info!(
            title = %issue.title,
            destination_iid = created.iid,
            "Issue created"
        );

        let notes = notes::replicate_notes(ctx, iid, created.iid).await?;

        if issue.is_closed() {
            ctx.destination
                .update_issue_state(
                    destination_project,
                    created.iid,
                    StateEvent::Close,
                    &issue.labels,
                )
                .await
                .map_err(|e| IssueError::CloseDestination {
                    iid: created.iid,
                    source: e,
                })?;
            debug!(destination_iid = created.iid, "Destination issue closed");
        }

        if let Some(template) = &ctx.options.link_text {
            let link = issue_reference(ctx, created.iid);
            let text = ctx.renderer.render_link(template, &link)?;
            ctx.source
                .create_issue_note(source_project, iid, &text)
                .await
                .map_err(|e| IssueError::LinkNote { iid, source: e })?;
            debug!(%link, "Link note added to source issue");
        }

        if ctx.options.auto_close {
            ctx.source
                .update_issue_state(source_project, iid, StateEvent::Close, &issue.labels)
                .await
                .map_err(|e| IssueError::CloseSource { iid, source: e })?;
            debug!("Source issue closed");
        }

        Ok(IssueOutcome::Migrated {
            destination_iid: created.iid,
            notes,
        })
    }
    .instrument(span)
    .await
}

/// Returns the display number of a destination issue titled `title`.
async fn find_by_title(
    ctx: &MigrationContext<'_>,
    title: &str,
) -> Result<Option<u64>, IssueError> {
    let project = ctx.destination_project.id;
    let mut found = None;

    walk(
        RESULTS_PER_PAGE,
        |page| ctx.destination.list_issues(project, page),
        |page| {
            found = page
                .iter()
                .find(|issue| issue.title == title)
                .map(|issue| issue.iid);
            Ok(if found.is_some() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            })
        },
    )
    .await
    .map_err(IssueError::ListDestinationIssues)?;

    Ok(found)
}

/// Builds the creation request, resolving assignee and milestone on the
/// destination.
async fn build_request(ctx: &MigrationContext<'_>, issue: &Issue) -> Result<NewIssue, IssueError> {
    let project = ctx.destination_project.id;

    let assignee_ids = match issue.assignee_username() {
        Some(username) => {
            let assignee = find_user(ctx, username).await?;
            if assignee.is_none() {
                warn!(username, "Assignee not found on destination, leaving unassigned");
            }
            assignee.map(|id| vec![id])
        }
        None => None,
    };

    let milestone_id = match issue.milestone_with_title() {
        Some(milestone) => Some(resolve_milestone(ctx.destination, project, milestone).await?.id),
        None => None,
    };

    Ok(NewIssue {
        title: issue.title.clone(),
        description: issue.description.clone().unwrap_or_default(),
        labels: issue.labels.clone(),
        assignee_ids,
        milestone_id,
    })
}

/// Returns the id of the destination project member named `username`.
async fn find_user(ctx: &MigrationContext<'_>, username: &str) -> Result<Option<u64>, IssueError> {
    let project = ctx.destination_project.id;
    let mut found = None;

    walk(
        RESULTS_PER_PAGE,
        |page| ctx.destination.list_users(project, page),
        |page| {
            found = page
                .iter()
                .find(|user| user.username == username)
                .map(|user| user.id);
            Ok(if found.is_some() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            })
        },
    )
    .await
    .map_err(IssueError::ListUsers)?;

    Ok(found)
}

/// Creates the destination issue, retrying once with a truncated
/// description if it is rejected as too large.
async fn create_destination_issue(
    ctx: &MigrationContext<'_>,
    request: &NewIssue,
) -> Result<Issue, IssueError> {
    let project = ctx.destination_project.id;

    match ctx.destination.create_issue(project, request).await {
        Ok(issue) => Ok(issue),
        Err(e) if e.is_too_large() => {
            if request.description.is_empty() {
                return Err(IssueError::TooLargeWithoutDescription {
                    title: request.title.clone(),
                    source: e,
                });
            }

            warn!(
                title = %request.title,
                max_chars = TRUNCATED_TEXT_CHARS,
                "Issue too large, retrying with truncated description"
            );
            let shorter = request.with_truncated_description(TRUNCATED_TEXT_CHARS);
            ctx.destination
                .create_issue(project, &shorter)
                .await
                .map_err(|e| IssueError::Create {
                    title: request.title.clone(),
                    source: e,
                })
        }
        Err(e) => Err(IssueError::Create {
            title: request.title.clone(),
            source: e,
        }),
    }
}

/// `<project>#<iid>` reference to a destination issue.
///
/// GitLab renders `namespace/project#iid` as a link only within one server,
/// so the full web URL is used across servers.
fn issue_reference(ctx: &MigrationContext<'_>, destination_iid: u64) -> String {
    let project = if same_server(ctx.source.base_url(), ctx.destination.base_url()) {
        &ctx.destination_project.path_with_namespace
    } else {
        &ctx.destination_project.web_url
    };
    format!("{project}#{destination_iid}")
}

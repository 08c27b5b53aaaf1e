//! Milestone replication and lookup.
//!
//! Milestones are matched by exact title. Issue migration creates them
//! lazily through [`resolve_milestone`]; milestones-only runs copy them all
//! at once with [`replicate_milestones`].

mod error;

pub use error::MilestoneError;

use crate::gitlab::{GitLabApi, Milestone, NewMilestone, ProjectId, StateEvent};
use crate::pagination::{collect_all, walk, RESULTS_PER_PAGE};
use std::ops::ControlFlow;
use tracing::{debug, info};

/// Creates every source milestone on the destination.
///
/// Milestones closed on the source are closed right after creation. No
/// check is made for milestones already present on the destination.
///
/// # Returns
///
/// The number of milestones created.
///
/// # Errors
///
/// Returns [`MilestoneError`] on the first listing, creation or close
/// failure.
pub async fn replicate_milestones(
    source: &dyn GitLabApi,
    destination: &dyn GitLabApi,
    source_project: ProjectId,
    destination_project: ProjectId,
) -> Result<usize, MilestoneError> {
    let milestones = collect_all(RESULTS_PER_PAGE, |page| {
        source.list_milestones(source_project, page)
    })
    .await
    .map_err(MilestoneError::List)?;

    info!(count = milestones.len(), "Replicating milestones");

    for milestone in &milestones {
        let created = create_milestone(destination, destination_project, milestone).await?;

        if milestone.is_closed() {
            destination
                .update_milestone_state(destination_project, created.id, StateEvent::Close)
                .await
                .map_err(|e| MilestoneError::Close {
                    title: milestone.title.clone(),
                    source: e,
                })?;
            debug!(milestone = %milestone.title, "Milestone closed");
        }
    }

    Ok(milestones.len())
}

/// Finds the destination milestone titled like `milestone`, creating it if
/// absent.
///
/// # Errors
///
/// Returns [`MilestoneError`] if listing or creation fails.
pub async fn resolve_milestone(
    destination: &dyn GitLabApi,
    project: ProjectId,
    milestone: &Milestone,
) -> Result<Milestone, MilestoneError> {
    let mut found = None;
    walk(
        RESULTS_PER_PAGE,
        |page| destination.list_milestones(project, page),
        |page| {
            found = page.into_iter().find(|m| m.title == milestone.title);
            Ok(if found.is_some() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            })
        },
    )
    .await
    .map_err(|e| MilestoneError::Resolve {
        title: milestone.title.clone(),
        source: e,
    })?;

    if let Some(existing) = found {
        debug!(milestone = %existing.title, id = existing.id, "Milestone found");
        return Ok(existing);
    }

    create_milestone(destination, project, milestone).await
}

async fn create_milestone(
    destination: &dyn GitLabApi,
    project: ProjectId,
    milestone: &Milestone,
) -> Result<Milestone, MilestoneError> {
    let created = destination
        .create_milestone(project, &NewMilestone::from(milestone))
        .await
        .map_err(|e| MilestoneError::Create {
            title: milestone.title.clone(),
            source: e,
        })?;
    debug!(milestone = %created.title, id = created.id, "Milestone created");
    Ok(created)
}

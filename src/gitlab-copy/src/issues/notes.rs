//! Note replication.

use super::{IssueError, MigrationContext, TRUNCATED_TEXT_CHARS};
use crate::gitlab::{truncate_chars, ApiError, GitLabApi, Note, ProjectId};
use crate::pagination::{collect_all, RESULTS_PER_PAGE};
use tracing::{debug, warn};

/// Copies every note of source issue `source_iid` onto destination issue
/// `destination_iid`, oldest first.
///
/// Notes whose author has a configured token are posted as that user with
/// their body unchanged. Others are posted by the destination token with an
/// attribution header.
pub(super) async fn replicate_notes(
    ctx: &MigrationContext<'_>,
    source_iid: u64,
    destination_iid: u64,
) -> Result<usize, IssueError> {
    let source_project = ctx.source_project.id;
    let notes = collect_all(RESULTS_PER_PAGE, |page| {
        ctx.source
            .list_issue_notes(source_project, source_iid, page)
    })
    .await
    .map_err(|e| IssueError::ListNotes {
        iid: source_iid,
        source: e,
    })?;

    // Listed newest first.
    for note in notes.iter().rev() {
        let (client, body) = match ctx.user_clients.get(&note.author.username) {
            Some(client) => (client.as_ref(), note.body.clone()),
            None => (ctx.destination, attributed_body(note)),
        };

        post_note(client, ctx.destination_project.id, destination_iid, &body)
            .await
            .map_err(|e| IssueError::CreateNote {
                note_id: note.id,
                source: e,
            })?;
        debug!(note_id = note.id, author = %note.author.username, "Note copied");
    }

    Ok(notes.len())
}

/// Posts a note, retrying once with a truncated body if it is too large.
async fn post_note(
    client: &dyn GitLabApi,
    project: ProjectId,
    iid: u64,
    body: &str,
) -> Result<(), ApiError> {
    match client.create_issue_note(project, iid, body).await {
        Ok(_) => Ok(()),
        Err(e) if e.is_too_large() => {
            warn!(
                iid,
                max_chars = TRUNCATED_TEXT_CHARS,
                "Note too large, retrying with truncated body"
            );
            let shorter = truncate_chars(body, TRUNCATED_TEXT_CHARS);
            client.create_issue_note(project, iid, &shorter).await?;
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Prefixes a note with its original author and date.
pub(super) fn attributed_body(note: &Note) -> String {
    format!(
        "{} @{} wrote on {} :\n\n{}",
        note.author.name,
        note.author.username,
        note.created_at.format("%a, %d %b %Y %H:%M:%S %Z"),
        note.body
    )
}

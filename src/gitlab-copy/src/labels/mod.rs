//! Label replication.
//!
//! Every source label is created on the destination with the same name,
//! color and description. Labels that already exist are left untouched, so
//! replicating twice is harmless.

mod error;

pub use error::LabelError;

use crate::gitlab::{GitLabApi, NewLabel, ProjectId};
use crate::pagination::{collect_all, RESULTS_PER_PAGE};
use tracing::{debug, info};

/// Creates every source label on the destination.
///
/// # Arguments
///
/// * `source` - Client of the source server
/// * `destination` - Client of the destination server
/// * `source_project` - Project to read labels from
/// * `destination_project` - Project to create labels in
///
/// # Returns
///
/// The number of labels actually created.
///
/// # Errors
///
/// Returns [`LabelError`] if listing fails or a creation fails for any
/// reason other than the label already existing.
pub async fn replicate_labels(
    source: &dyn GitLabApi,
    destination: &dyn GitLabApi,
    source_project: ProjectId,
    destination_project: ProjectId,
) -> Result<usize, LabelError> {
    let labels = collect_all(RESULTS_PER_PAGE, |page| {
        source.list_labels(source_project, page)
    })
    .await
    .map_err(LabelError::List)?;

    info!(count = labels.len(), "Replicating labels");

    let mut created = 0;
    for label in &labels {
        match destination
            .create_label(destination_project, &NewLabel::from(label))
            .await
        {
            Ok(_) => {
                debug!(label = %label.name, "Label created");
                created += 1;
            }
            Err(e) if e.is_conflict() => {
                debug!(label = %label.name, "Label already exists");
            }
            Err(e) => {
                return Err(LabelError::Create {
                    name: label.name.clone(),
                    source: e,
                });
            }
        }
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gitlab::fake::{FakeGitLab, Op};
    use crate::gitlab::ApiError;

    fn servers() -> (FakeGitLab, FakeGitLab) {
        (
            FakeGitLab::new("https://source.example.com/api/v4", "team/app"),
            FakeGitLab::new("https://dest.example.com/api/v4", "team/app"),
        )
    }

    fn names(fake: &FakeGitLab) -> Vec<String> {
        fake.labels().into_iter().map(|label| label.name).collect()
    }

    #[tokio::test]
    async fn copies_every_label() {
        let (source, destination) = servers();
        source.add_label("bug", "#ff0000");
        source.add_label("doc", "#00ff00");

        let created = replicate_labels(&source, &destination, 1, 1).await.unwrap();

        assert_eq!(created, 2);
        assert_eq!(names(&destination), vec!["bug", "doc"]);
        assert_eq!(destination.labels()[0].color, "#ff0000");
    }

    #[tokio::test]
    async fn second_run_creates_nothing() {
        let (source, destination) = servers();
        source.add_label("bug", "#ff0000");
        source.add_label("doc", "#00ff00");

        replicate_labels(&source, &destination, 1, 1).await.unwrap();
        let created = replicate_labels(&source, &destination, 1, 1).await.unwrap();

        assert_eq!(created, 0);
        assert_eq!(destination.labels().len(), 2);
    }

    #[tokio::test]
    async fn existing_labels_are_not_updated() {
        let (source, destination) = servers();
        source.add_label("bug", "#ff0000");
        destination.add_label("bug", "#0000ff");

        replicate_labels(&source, &destination, 1, 1).await.unwrap();

        assert_eq!(destination.labels().len(), 1);
        assert_eq!(destination.labels()[0].color, "#0000ff");
    }

    #[tokio::test]
    async fn walks_every_label_page() {
        let (source, destination) = servers();
        for n in 0..(RESULTS_PER_PAGE + 5) {
            source.add_label(&format!("label-{n}"), "#123456");
        }

        let created = replicate_labels(&source, &destination, 1, 1).await.unwrap();

        assert_eq!(created, RESULTS_PER_PAGE as usize + 5);
    }

    #[tokio::test]
    async fn other_creation_failures_name_the_label() {
        let (source, destination) = servers();
        source.add_label("bug", "#ff0000");
        destination.fail(
            Op::CreateLabel,
            ApiError::Status {
                status: 500,
                message: "boom".to_string(),
            },
        );

        let err = replicate_labels(&source, &destination, 1, 1)
            .await
            .unwrap_err();

        assert!(matches!(err, LabelError::Create { ref name, .. } if name == "bug"));
    }

    #[tokio::test]
    async fn listing_failure_aborts() {
        let (source, destination) = servers();
        source.fail(Op::ListLabels, ApiError::Transport("down".to_string()));

        let err = replicate_labels(&source, &destination, 1, 1)
            .await
            .unwrap_err();

        assert!(matches!(err, LabelError::List(ApiError::Transport(_))));
        assert!(destination.calls().is_empty());
    }
}

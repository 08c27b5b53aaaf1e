//! GitLab API resource types.
//!
//! Only the fields the migration reads are modelled; unknown fields in API
//! responses are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Numeric project handle returned by project lookup.
pub type ProjectId = u64;

/// A GitLab project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub path_with_namespace: String,
    pub web_url: String,
}

/// A project label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: u64,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Payload for label creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLabel {
    pub name: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&Label> for NewLabel {
    fn from(label: &Label) -> Self {
        Self {
            name: label.name.clone(),
            color: label.color.clone(),
            description: label.description.clone(),
        }
    }
}

/// A project milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Due date as `YYYY-MM-DD`.
    #[serde(default)]
    pub due_date: Option<String>,
    /// `active` or `closed`.
    #[serde(default)]
    pub state: String,
}

impl Milestone {
    /// Returns true if the milestone is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == "closed"
    }
}

/// Payload for milestone creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMilestone {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl From<&Milestone> for NewMilestone {
    fn from(milestone: &Milestone) -> Self {
        Self {
            title: milestone.title.clone(),
            description: milestone.description.clone(),
            due_date: milestone.due_date.clone(),
        }
    }
}

/// A GitLab user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: String,
}

/// A project issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Global identifier.
    pub id: u64,
    /// Project-local display number.
    pub iid: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `opened` or `closed`.
    pub state: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignee: Option<User>,
    #[serde(default)]
    pub milestone: Option<Milestone>,
}

impl Issue {
    /// Returns true if the issue is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == "closed"
    }

    /// Username of the assignee, if any.
    #[must_use]
    pub fn assignee_username(&self) -> Option<&str> {
        self.assignee
            .as_ref()
            .map(|user| user.username.as_str())
            .filter(|name| !name.is_empty())
    }

    /// The milestone, if set with a non-empty title.
    #[must_use]
    pub fn milestone_with_title(&self) -> Option<&Milestone> {
        self.milestone
            .as_ref()
            .filter(|milestone| !milestone.title.is_empty())
    }
}

/// Payload for issue creation.
///
/// A retry builds a new value through
/// [`with_truncated_description`][NewIssue::with_truncated_description]
/// rather than mutating the previous attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    #[serde(serialize_with = "comma_separated")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<u64>,
}

impl NewIssue {
    /// Returns a copy whose description keeps at most `max_chars` characters.
    #[must_use]
    pub fn with_truncated_description(&self, max_chars: usize) -> Self {
        Self {
            description: truncate_chars(&self.description, max_chars),
            ..self.clone()
        }
    }
}

/// An issue comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub body: String,
    pub author: User,
    pub created_at: DateTime<Utc>,
}

/// State transition applied to issues and milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateEvent {
    Close,
}

impl StateEvent {
    /// Wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Close => "close",
        }
    }
}

/// Keeps the first `max_chars` characters of `text`.
///
/// Counts characters rather than bytes so multi-byte text is never split.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

fn comma_separated<S: Serializer>(labels: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&labels.join(","))
}

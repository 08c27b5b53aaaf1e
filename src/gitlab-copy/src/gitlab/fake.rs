//! In-memory [`GitLabApi`] double for unit tests.
//!
//! One [`FakeGitLab`] models one project on one server. Clients created with
//! [`FakeGitLab::as_user`] share the same data but act as another user, the
//! way per-user tokens do against a real server.

use super::{
    ApiError, GitLabApi, Issue, Label, Milestone, NewIssue, NewLabel, NewMilestone, Note, Project,
    ProjectId, StateEvent, User,
};
use crate::pagination::PageRequest;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use url::Url;

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    CurrentUser,
    GetProject,
    ListLabels,
    CreateLabel,
    ListMilestones,
    CreateMilestone,
    UpdateMilestone,
    ListIssues,
    GetIssue,
    CreateIssue,
    UpdateIssue,
    DeleteIssue,
    ListUsers,
    ListNotes,
    CreateNote,
}

/// A mutating call, recorded before any injected failure applies.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    CreateLabel(String),
    CreateMilestone(String),
    UpdateMilestone { id: u64, event: StateEvent },
    CreateIssue(NewIssue),
    UpdateIssue {
        iid: u64,
        event: StateEvent,
        labels: Vec<String>,
    },
    DeleteIssue(u64),
    CreateNote {
        iid: u64,
        author: String,
        body: String,
    },
}

#[derive(Debug)]
struct State {
    project: Project,
    labels: Vec<Label>,
    milestones: Vec<Milestone>,
    issues: Vec<Issue>,
    users: Vec<User>,
    notes: HashMap<u64, Vec<Note>>,
    queued_failures: HashMap<Op, VecDeque<ApiError>>,
    failures: HashMap<Op, ApiError>,
    calls: Vec<Call>,
    next_id: u64,
    clock: DateTime<Utc>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += Duration::minutes(1);
        self.clock
    }

    fn check(&mut self, op: Op) -> Result<(), ApiError> {
        if let Some(error) = self.queued_failures.get_mut(&op).and_then(VecDeque::pop_front) {
            return Err(error);
        }
        match self.failures.get(&op) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn check_project(&self, project: ProjectId) -> Result<(), ApiError> {
        if project == self.project.id {
            Ok(())
        } else {
            Err(ApiError::NotFound {
                resource: format!("project {project}"),
            })
        }
    }
}

/// Shared-state fake GitLab server.
#[derive(Debug, Clone)]
pub(crate) struct FakeGitLab {
    state: Arc<Mutex<State>>,
    base_url: Url,
    user: User,
}

impl FakeGitLab {
    /// A server at `base_url` hosting the project `path` as project id 1.
    pub(crate) fn new(base_url: &str, path: &str) -> Self {
        let base_url = Url::parse(base_url).unwrap();
        let web_url = format!(
            "{}://{}/{path}",
            base_url.scheme(),
            base_url.host_str().unwrap_or_default()
        );
        let project = Project {
            id: 1,
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path_with_namespace: path.to_string(),
            web_url,
        };
        let owner = User {
            id: 1,
            username: "root".to_string(),
            name: "Administrator".to_string(),
        };

        Self {
            state: Arc::new(Mutex::new(State {
                project,
                labels: Vec::new(),
                milestones: Vec::new(),
                issues: Vec::new(),
                users: vec![owner.clone()],
                notes: HashMap::new(),
                queued_failures: HashMap::new(),
                failures: HashMap::new(),
                calls: Vec::new(),
                next_id: 1000,
                clock: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            })),
            base_url,
            user: owner,
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// A client on the same server acting as `username`.
    pub(crate) fn as_user(&self, username: &str) -> Self {
        let user = self
            .state()
            .users
            .iter()
            .find(|user| user.username == username)
            .cloned()
            .unwrap_or_else(|| panic!("unknown user {username}"));
        Self {
            state: Arc::clone(&self.state),
            base_url: self.base_url.clone(),
            user,
        }
    }

    pub(crate) fn project(&self) -> Project {
        self.state().project.clone()
    }

    pub(crate) fn add_user(&self, username: &str, name: &str) -> User {
        let mut state = self.state();
        let user = User {
            id: state.next_id(),
            username: username.to_string(),
            name: name.to_string(),
        };
        state.users.push(user.clone());
        user
    }

    pub(crate) fn add_label(&self, name: &str, color: &str) {
        let mut state = self.state();
        let id = state.next_id();
        state.labels.push(Label {
            id,
            name: name.to_string(),
            color: color.to_string(),
            description: None,
        });
    }

    pub(crate) fn add_milestone(&self, title: &str, closed: bool) -> Milestone {
        let mut state = self.state();
        let milestone = Milestone {
            id: state.next_id(),
            title: title.to_string(),
            description: Some(format!("{title} description")),
            due_date: Some("2024-06-30".to_string()),
            state: if closed { "closed" } else { "active" }.to_string(),
        };
        state.milestones.push(milestone.clone());
        milestone
    }

    /// Adds an issue, assigning a global id when `issue.id` is 0.
    pub(crate) fn add_issue(&self, mut issue: Issue) {
        let mut state = self.state();
        if issue.id == 0 {
            issue.id = state.next_id();
        }
        state.issues.push(issue);
    }

    /// Adds a note to issue `iid`, later than every existing note.
    pub(crate) fn add_note(&self, iid: u64, author: &User, body: &str) {
        let mut state = self.state();
        let note = Note {
            id: state.next_id(),
            body: body.to_string(),
            author: author.clone(),
            created_at: state.tick(),
        };
        state.notes.entry(iid).or_default().push(note);
    }

    /// Makes every call of `op` fail with `error`.
    pub(crate) fn fail(&self, op: Op, error: ApiError) {
        self.state().failures.insert(op, error);
    }

    /// Makes the next `times` calls of `op` fail with `error`.
    pub(crate) fn fail_times(&self, op: Op, error: ApiError, times: usize) {
        let mut state = self.state();
        let queue = state.queued_failures.entry(op).or_default();
        queue.extend(std::iter::repeat(error).take(times));
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub(crate) fn labels(&self) -> Vec<Label> {
        self.state().labels.clone()
    }

    pub(crate) fn milestones(&self) -> Vec<Milestone> {
        self.state().milestones.clone()
    }

    pub(crate) fn issues(&self) -> Vec<Issue> {
        self.state().issues.clone()
    }

    /// Notes of issue `iid` in creation order.
    pub(crate) fn notes(&self, iid: u64) -> Vec<Note> {
        self.state().notes.get(&iid).cloned().unwrap_or_default()
    }
}

/// Builds an open issue with the given display number and title.
pub(crate) fn issue(iid: u64, title: &str) -> Issue {
    Issue {
        id: 0,
        iid,
        title: title.to_string(),
        description: Some(format!("Description of {title}")),
        state: "opened".to_string(),
        labels: Vec::new(),
        assignee: None,
        milestone: None,
    }
}

pub(crate) fn too_large() -> ApiError {
    ApiError::TooLarge { status: 413 }
}

fn page<T: Clone>(items: &[T], request: PageRequest) -> Vec<T> {
    let per_page = request.per_page.max(1) as usize;
    let start = (request.page.max(1) as usize - 1) * per_page;
    items.iter().skip(start).take(per_page).cloned().collect()
}

#[async_trait]
impl GitLabApi for FakeGitLab {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.state().check(Op::CurrentUser)?;
        Ok(self.user.clone())
    }

    async fn get_project(&self, name: &str) -> Result<Project, ApiError> {
        let mut state = self.state();
        state.check(Op::GetProject)?;
        if name == state.project.path_with_namespace || name == state.project.id.to_string() {
            Ok(state.project.clone())
        } else {
            Err(ApiError::NotFound {
                resource: format!("project '{name}'"),
            })
        }
    }

    async fn list_labels(
        &self,
        project: ProjectId,
        request: PageRequest,
    ) -> Result<Vec<Label>, ApiError> {
        let mut state = self.state();
        state.check_project(project)?;
        state.check(Op::ListLabels)?;
        Ok(page(&state.labels, request))
    }

    async fn create_label(&self, project: ProjectId, label: &NewLabel) -> Result<Label, ApiError> {
        let mut state = self.state();
        state.check_project(project)?;
        state.calls.push(Call::CreateLabel(label.name.clone()));
        state.check(Op::CreateLabel)?;
        if state.labels.iter().any(|existing| existing.name == label.name) {
            return Err(ApiError::Conflict {
                resource: format!("label '{}'", label.name),
            });
        }
        let created = Label {
            id: state.next_id(),
            name: label.name.clone(),
            color: label.color.clone(),
            description: label.description.clone(),
        };
        state.labels.push(created.clone());
        Ok(created)
    }

    async fn list_milestones(
        &self,
        project: ProjectId,
        request: PageRequest,
    ) -> Result<Vec<Milestone>, ApiError> {
        let mut state = self.state();
        state.check_project(project)?;
        state.check(Op::ListMilestones)?;
        Ok(page(&state.milestones, request))
    }

    async fn create_milestone(
        &self,
        project: ProjectId,
        milestone: &NewMilestone,
    ) -> Result<Milestone, ApiError> {
        let mut state = self.state();
        state.check_project(project)?;
        state.calls.push(Call::CreateMilestone(milestone.title.clone()));
        state.check(Op::CreateMilestone)?;
        let created = Milestone {
            id: state.next_id(),
            title: milestone.title.clone(),
            description: milestone.description.clone(),
            due_date: milestone.due_date.clone(),
            state: "active".to_string(),
        };
        state.milestones.push(created.clone());
        Ok(created)
    }

    async fn update_milestone_state(
        &self,
        project: ProjectId,
        milestone_id: u64,
        event: StateEvent,
    ) -> Result<Milestone, ApiError> {
        let mut state = self.state();
        state.check_project(project)?;
        state.calls.push(Call::UpdateMilestone {
            id: milestone_id,
            event,
        });
        state.check(Op::UpdateMilestone)?;
        let milestone = state
            .milestones
            .iter_mut()
            .find(|milestone| milestone.id == milestone_id)
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("milestone {milestone_id}"),
            })?;
        milestone.state = match event {
            StateEvent::Close => "closed",
        }
        .to_string();
        Ok(milestone.clone())
    }

    async fn list_issues(
        &self,
        project: ProjectId,
        request: PageRequest,
    ) -> Result<Vec<Issue>, ApiError> {
        let mut state = self.state();
        state.check_project(project)?;
        state.check(Op::ListIssues)?;
        Ok(page(&state.issues, request))
    }

    async fn get_issue(&self, project: ProjectId, iid: u64) -> Result<Issue, ApiError> {
        let mut state = self.state();
        state.check_project(project)?;
        state.check(Op::GetIssue)?;
        state
            .issues
            .iter()
            .find(|issue| issue.iid == iid)
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("issue #{iid}"),
            })
    }

    async fn create_issue(&self, project: ProjectId, issue: &NewIssue) -> Result<Issue, ApiError> {
        let mut state = self.state();
        state.check_project(project)?;
        state.calls.push(Call::CreateIssue(issue.clone()));
        state.check(Op::CreateIssue)?;

        let assignee = issue
            .assignee_ids
            .as_ref()
            .and_then(|ids| ids.first())
            .and_then(|id| state.users.iter().find(|user| user.id == *id).cloned());
        let milestone = issue
            .milestone_id
            .and_then(|id| state.milestones.iter().find(|m| m.id == id).cloned());
        let iid = state.issues.iter().map(|i| i.iid).max().unwrap_or(0) + 1;
        let created = Issue {
            id: state.next_id(),
            iid,
            title: issue.title.clone(),
            description: Some(issue.description.clone()),
            state: "opened".to_string(),
            labels: issue.labels.clone(),
            assignee,
            milestone,
        };
        state.issues.push(created.clone());
        Ok(created)
    }

    async fn update_issue_state(
        &self,
        project: ProjectId,
        iid: u64,
        event: StateEvent,
        labels: &[String],
    ) -> Result<Issue, ApiError> {
        let mut state = self.state();
        state.check_project(project)?;
        state.calls.push(Call::UpdateIssue {
            iid,
            event,
            labels: labels.to_vec(),
        });
        state.check(Op::UpdateIssue)?;
        let issue = state
            .issues
            .iter_mut()
            .find(|issue| issue.iid == iid)
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("issue #{iid}"),
            })?;
        issue.state = match event {
            StateEvent::Close => "closed",
        }
        .to_string();
        issue.labels = labels.to_vec();
        Ok(issue.clone())
    }

    async fn delete_issue(&self, project: ProjectId, iid: u64) -> Result<(), ApiError> {
        let mut state = self.state();
        state.check_project(project)?;
        state.calls.push(Call::DeleteIssue(iid));
        state.check(Op::DeleteIssue)?;
        let before = state.issues.len();
        state.issues.retain(|issue| issue.iid != iid);
        if state.issues.len() == before {
            return Err(ApiError::NotFound {
                resource: format!("issue #{iid}"),
            });
        }
        Ok(())
    }

    async fn list_users(
        &self,
        project: ProjectId,
        request: PageRequest,
    ) -> Result<Vec<User>, ApiError> {
        let mut state = self.state();
        state.check_project(project)?;
        state.check(Op::ListUsers)?;
        Ok(page(&state.users, request))
    }

    async fn list_issue_notes(
        &self,
        project: ProjectId,
        iid: u64,
        request: PageRequest,
    ) -> Result<Vec<Note>, ApiError> {
        let mut state = self.state();
        state.check_project(project)?;
        state.check(Op::ListNotes)?;
        let mut notes = state.notes.get(&iid).cloned().unwrap_or_default();
        notes.reverse();
        Ok(page(&notes, request))
    }

    async fn create_issue_note(
        &self,
        project: ProjectId,
        iid: u64,
        body: &str,
    ) -> Result<Note, ApiError> {
        let mut state = self.state();
        state.check_project(project)?;
        state.calls.push(Call::CreateNote {
            iid,
            author: self.user.username.clone(),
            body: body.to_string(),
        });
        state.check(Op::CreateNote)?;
        let note = Note {
            id: state.next_id(),
            body: body.to_string(),
            author: self.user.clone(),
            created_at: state.tick(),
        };
        state.notes.entry(iid).or_default().push(note.clone());
        Ok(note)
    }
}

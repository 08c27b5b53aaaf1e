//! REST API v4 implementation of [`GitLabApi`].

use super::types::{
    Issue, Label, Milestone, NewIssue, NewLabel, NewMilestone, Note, Project, ProjectId,
    StateEvent, User,
};
use super::{ApiError, GitLabApi};
use crate::pagination::PageRequest;
use crate::rate_limit::{retry_after_secs, wait_for_retry_after, wait_if_needed, RateLimitInfo};
use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Header carrying the personal access token.
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Per-request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Builder for [`GitLabClient`].
#[derive(Debug, Clone)]
pub struct GitLabClientBuilder {
    base_url: String,
    token: String,
    insecure: bool,
    timeout: Duration,
}

impl GitLabClientBuilder {
    /// Disables TLS certificate verification.
    #[must_use]
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] for an unusable base URL and
    /// [`ApiError::Transport`] if the HTTP client cannot be created.
    pub fn build(self) -> Result<GitLabClient, ApiError> {
        let base_url = Url::parse(&self.base_url).map_err(|e| ApiError::InvalidUrl {
            url: self.base_url.clone(),
            message: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl {
                url: self.base_url,
                message: "expected an http(s) URL".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("gitlab-copy/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.insecure)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(GitLabClient {
            http,
            base_url,
            token: self.token,
        })
    }
}

/// GitLab REST client bound to one server and one token.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl GitLabClient {
    /// Starts building a client for `base_url` (including `/api/v4`).
    pub fn builder(base_url: impl Into<String>, token: impl Into<String>) -> GitLabClientBuilder {
        GitLabClientBuilder {
            base_url: base_url.into(),
            token: token.into(),
            insecure: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint<I>(&self, segments: I) -> Result<Url, ApiError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| ApiError::InvalidUrl {
                url: self.base_url.to_string(),
                message: "URL cannot be a base".to_string(),
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Sends a request, honouring rate limits and retrying once on HTTP 429.
    async fn execute(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
        body: Option<&Value>,
        resource: &str,
    ) -> Result<Response, ApiError> {
        let mut retried = false;

        loop {
            debug!(%method, %url, "GitLab request");
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .header(TOKEN_HEADER, &self.token);
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request
                .send()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?;

            if let Some(info) = RateLimitInfo::from_headers(response.headers()) {
                wait_if_needed(&info).await;
            }

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = retry_after_secs(response.headers());
                if retried {
                    return Err(ApiError::RateLimited { retry_after });
                }
                wait_for_retry_after(retry_after).await;
                retried = true;
                continue;
            }

            return check_status(response, resource).await;
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
        resource: &str,
    ) -> Result<T, ApiError> {
        let response = self.execute(Method::GET, url, query, None, resource).await?;
        decode(response).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &Value,
        resource: &str,
    ) -> Result<T, ApiError> {
        let response = self
            .execute(method, url, &[], Some(body), resource)
            .await?;
        decode(response).await
    }
}

fn page_query(page: PageRequest) -> Vec<(&'static str, String)> {
    vec![
        ("page", page.page.to_string()),
        ("per_page", page.per_page.to_string()),
    ]
}

fn encode<T: Serialize>(payload: &T) -> Result<Value, ApiError> {
    serde_json::to_value(payload).map_err(|e| ApiError::Decode(format!("cannot encode request: {e}")))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Maps non-success statuses onto [`ApiError`].
async fn check_status(response: Response, resource: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let resource = resource.to_string();
    match status {
        StatusCode::NOT_FOUND => Err(ApiError::NotFound { resource }),
        StatusCode::CONFLICT => Err(ApiError::Conflict { resource }),
        StatusCode::PAYLOAD_TOO_LARGE | StatusCode::URI_TOO_LONG => Err(ApiError::TooLarge {
            status: status.as_u16(),
        }),
        _ => {
            let message = response.text().await.unwrap_or_default();
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl GitLabApi for GitLabClient {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        let url = self.endpoint(["user"])?;
        self.get(url, &[], "current user").await
    }

    async fn get_project(&self, name: &str) -> Result<Project, ApiError> {
        let url = self.endpoint(["projects", name])?;
        self.get(url, &[], &format!("project '{name}'")).await
    }

    async fn list_labels(
        &self,
        project: ProjectId,
        page: PageRequest,
    ) -> Result<Vec<Label>, ApiError> {
        let url = self.endpoint(["projects", &project.to_string(), "labels"])?;
        self.get(url, &page_query(page), "labels").await
    }

    async fn create_label(&self, project: ProjectId, label: &NewLabel) -> Result<Label, ApiError> {
        let url = self.endpoint(["projects", &project.to_string(), "labels"])?;
        self.send(
            Method::POST,
            url,
            &encode(label)?,
            &format!("label '{}'", label.name),
        )
        .await
    }

    async fn list_milestones(
        &self,
        project: ProjectId,
        page: PageRequest,
    ) -> Result<Vec<Milestone>, ApiError> {
        let url = self.endpoint(["projects", &project.to_string(), "milestones"])?;
        self.get(url, &page_query(page), "milestones").await
    }

    async fn create_milestone(
        &self,
        project: ProjectId,
        milestone: &NewMilestone,
    ) -> Result<Milestone, ApiError> {
        let url = self.endpoint(["projects", &project.to_string(), "milestones"])?;
        self.send(
            Method::POST,
            url,
            &encode(milestone)?,
            &format!("milestone '{}'", milestone.title),
        )
        .await
    }

    async fn update_milestone_state(
        &self,
        project: ProjectId,
        milestone_id: u64,
        event: StateEvent,
    ) -> Result<Milestone, ApiError> {
        let url = self.endpoint([
            "projects",
            &project.to_string(),
            "milestones",
            &milestone_id.to_string(),
        ])?;
        self.send(
            Method::PUT,
            url,
            &json!({ "state_event": event.as_str() }),
            &format!("milestone {milestone_id}"),
        )
        .await
    }

    async fn list_issues(
        &self,
        project: ProjectId,
        page: PageRequest,
    ) -> Result<Vec<Issue>, ApiError> {
        let url = self.endpoint(["projects", &project.to_string(), "issues"])?;
        let mut query = page_query(page);
        query.push(("order_by", "created_at".to_string()));
        query.push(("sort", "asc".to_string()));
        self.get(url, &query, "issues").await
    }

    async fn get_issue(&self, project: ProjectId, iid: u64) -> Result<Issue, ApiError> {
        let url = self.endpoint(["projects", &project.to_string(), "issues", &iid.to_string()])?;
        self.get(url, &[], &format!("issue #{iid}")).await
    }

    async fn create_issue(&self, project: ProjectId, issue: &NewIssue) -> Result<Issue, ApiError> {
        let url = self.endpoint(["projects", &project.to_string(), "issues"])?;
        self.send(
            Method::POST,
            url,
            &encode(issue)?,
            &format!("issue '{}'", issue.title),
        )
        .await
    }

    async fn update_issue_state(
        &self,
        project: ProjectId,
        iid: u64,
        event: StateEvent,
        labels: &[String],
    ) -> Result<Issue, ApiError> {
        let url = self.endpoint(["projects", &project.to_string(), "issues", &iid.to_string()])?;
        self.send(
            Method::PUT,
            url,
            &json!({ "state_event": event.as_str(), "labels": labels.join(",") }),
            &format!("issue #{iid}"),
        )
        .await
    }

    async fn delete_issue(&self, project: ProjectId, iid: u64) -> Result<(), ApiError> {
        let url = self.endpoint(["projects", &project.to_string(), "issues", &iid.to_string()])?;
        self.execute(Method::DELETE, url, &[], None, &format!("issue #{iid}"))
            .await?;
        Ok(())
    }

    async fn list_users(
        &self,
        project: ProjectId,
        page: PageRequest,
    ) -> Result<Vec<User>, ApiError> {
        let url = self.endpoint(["projects", &project.to_string(), "users"])?;
        self.get(url, &page_query(page), "users").await
    }

    async fn list_issue_notes(
        &self,
        project: ProjectId,
        iid: u64,
        page: PageRequest,
    ) -> Result<Vec<Note>, ApiError> {
        let url = self.endpoint([
            "projects",
            &project.to_string(),
            "issues",
            &iid.to_string(),
            "notes",
        ])?;
        let mut query = page_query(page);
        query.push(("order_by", "created_at".to_string()));
        query.push(("sort", "desc".to_string()));
        self.get(url, &query, &format!("notes of issue #{iid}")).await
    }

    async fn create_issue_note(
        &self,
        project: ProjectId,
        iid: u64,
        body: &str,
    ) -> Result<Note, ApiError> {
        let url = self.endpoint([
            "projects",
            &project.to_string(),
            "issues",
            &iid.to_string(),
            "notes",
        ])?;
        self.send(
            Method::POST,
            url,
            &json!({ "body": body }),
            &format!("note on issue #{iid}"),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> GitLabClient {
        GitLabClient::builder(base, "token").build().unwrap()
    }

    #[test]
    fn encodes_project_paths_as_single_segment() {
        let client = client("https://gitlab.example.com/api/v4");
        let url = client.endpoint(["projects", "group/sub/project"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://gitlab.example.com/api/v4/projects/group%2Fsub%2Fproject"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(
            GitLabClient::builder("not a url", "t").build(),
            Err(ApiError::InvalidUrl { .. })
        ));
        assert!(matches!(
            GitLabClient::builder("mailto:someone@example.com", "t").build(),
            Err(ApiError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn builds_page_query() {
        let query = page_query(PageRequest { page: 3, per_page: 50 });
        assert_eq!(
            query,
            vec![("page", "3".to_string()), ("per_page", "50".to_string())]
        );
    }
}

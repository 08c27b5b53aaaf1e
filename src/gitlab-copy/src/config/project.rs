//! Per-project configuration block.

use super::range::IssueRanges;
use super::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Path of the REST API appended to server URLs.
pub const API_PATH: &str = "/api/v4";

/// Link text used when `linkToTargetIssueText` is not set.
pub const DEFAULT_LINK_TEXT: &str = "Closed in favor of {{Link}}";

/// One side (`from` or `to`) of the migration configuration.
///
/// Mode flags are only read from the source block, the `users` map only
/// from the destination block.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// GitLab server URL, normalized to end with [`API_PATH`].
    #[serde(rename = "url", default)]
    pub server_url: String,

    /// Personal access token.
    #[serde(default)]
    pub token: String,

    /// Project name or `namespace/path`.
    #[serde(rename = "project", default)]
    pub name: String,

    /// Raw issue selection tokens.
    #[serde(default)]
    pub issues: Vec<IssueToken>,

    /// Copy labels only.
    #[serde(default)]
    pub labels_only: bool,

    /// Copy milestones only.
    #[serde(default)]
    pub milestones_only: bool,

    /// Delete source issues once copied.
    #[serde(default)]
    pub move_issues: bool,

    /// Close source issues once copied.
    #[serde(default)]
    pub auto_close_issues: bool,

    /// Add a note on the source issue linking to its copy.
    #[serde(default)]
    pub link_to_target_issue: bool,

    /// Handlebars template for the link note. Exposes `{{Link}}`.
    #[serde(default)]
    pub link_to_target_issue_text: String,

    /// Username to personal access token map, used to write notes as
    /// their original author.
    #[serde(default)]
    pub users: BTreeMap<String, String>,

    /// Parsed form of `issues`.
    #[serde(skip)]
    pub ranges: IssueRanges,
}

/// An entry of the `issues` list: YAML allows both `5` and `"8-10"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IssueToken {
    Number(u64),
    Text(String),
}

impl IssueToken {
    fn into_text(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

impl ProjectConfig {
    /// Checks required fields and normalizes the server URL.
    ///
    /// `side` is used in error messages ("source" or "destination").
    pub(crate) fn validate(&mut self, side: &str) -> Result<(), ConfigError> {
        if self.server_url.trim().is_empty() {
            return Err(missing(side, "server URL"));
        }
        if self.name.trim().is_empty() {
            return Err(missing(side, "name"));
        }
        if self.token.trim().is_empty() {
            return Err(missing(side, "token"));
        }
        self.server_url = normalize_server_url(&self.server_url);
        Ok(())
    }

    /// Parses `issues` into [`IssueRanges`].
    pub(crate) fn parse_issues(&mut self) -> Result<(), ConfigError> {
        let tokens: Vec<String> = self
            .issues
            .iter()
            .cloned()
            .map(IssueToken::into_text)
            .collect();
        self.ranges = IssueRanges::parse(&tokens)?;
        Ok(())
    }

    /// Returns true if the issue with display number `iid` is in scope.
    #[must_use]
    pub fn matches(&self, iid: u64) -> bool {
        self.ranges.matches(iid)
    }
}

fn missing(side: &str, what: &str) -> ConfigError {
    ConfigError::ValidationError {
        message: format!("missing {side} project's {what}"),
    }
}

/// Trims trailing slashes and appends [`API_PATH`] unless already present.
pub(crate) fn normalize_server_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.ends_with(API_PATH) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{API_PATH}")
    }
}

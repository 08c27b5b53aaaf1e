//! GitLab clients used by a run.

use super::RunnerError;
use crate::config::Config;
use crate::gitlab::{GitLabApi, GitLabClient};
use std::collections::BTreeMap;
use std::sync::Arc;

/// The source client, the destination client, and one destination client
/// per configured user token.
#[derive(Clone)]
pub struct Endpoints {
    pub source: Arc<dyn GitLabApi>,
    pub destination: Arc<dyn GitLabApi>,
    /// Destination clients keyed by username.
    pub users: BTreeMap<String, Arc<dyn GitLabApi>>,
}

impl Endpoints {
    /// Builds REST clients for every configured token.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Client`] if a client cannot be built.
    pub fn connect(config: &Config, insecure: bool) -> Result<Self, RunnerError> {
        let source = connect("source", &config.source.server_url, &config.source.token, insecure)?;
        let destination = connect(
            "destination",
            &config.destination.server_url,
            &config.destination.token,
            insecure,
        )?;

        let mut users = BTreeMap::new();
        for (username, token) in &config.destination.users {
            let client = connect("user", &config.destination.server_url, token, insecure)?;
            users.insert(username.clone(), client);
        }

        Ok(Self {
            source,
            destination,
            users,
        })
    }
}

fn connect(
    side: &'static str,
    url: &str,
    token: &str,
    insecure: bool,
) -> Result<Arc<dyn GitLabApi>, RunnerError> {
    let client = GitLabClient::builder(url, token)
        .insecure(insecure)
        .build()
        .map_err(|e| RunnerError::Client { side, source: e })?;
    Ok(Arc::new(client))
}

//! Workspace configuration collaborator.
//!
//! Supplies the serving host and the authentication headers for each
//! dispatch. The client takes this as an explicit value so tests can
//! substitute one without touching the process environment.

use crate::{Error, Result};

const HOST_ENV: &str = "DATABRICKS_HOST";
const TOKEN_ENV: &str = "DATABRICKS_TOKEN";

/// Host and credentials for one Databricks workspace.
#[derive(Clone)]
pub struct WorkspaceConfig {
    host: String,
    token: Option<String>,
}

// Manual Debug: the bearer token must never reach log output.
impl std::fmt::Debug for WorkspaceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceConfig")
            .field("host", &self.host)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl WorkspaceConfig {
    /// Configuration with an explicit host and bearer token.
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: Some(token.into()),
        }
    }

    /// Configuration for a host that needs no auth header (test servers).
    pub fn unauthenticated(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: None,
        }
    }

    /// Read `DATABRICKS_HOST` and `DATABRICKS_TOKEN` from the environment.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var(HOST_ENV)
            .map_err(|_| Error::Validation(format!("{HOST_ENV} is not set")))?;
        let token = std::env::var(TOKEN_ENV).ok();
        Ok(Self { host, token })
    }

    /// The workspace host, e.g. `https://my-workspace.cloud.databricks.com`.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Header-name/value pairs to merge into each outgoing request.
    pub fn authenticate(&self) -> Vec<(String, String)> {
        match &self.token {
            Some(token) => vec![("Authorization".to_string(), format!("Bearer {token}"))],
            None => Vec::new(),
        }
    }
}

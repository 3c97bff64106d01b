//! Argument types for MCP tools.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ListApplicationsRequest {
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub selector: Option<String>,
}

/// Arguments of the tools that only take an application name.
#[derive(Debug, Deserialize)]
pub struct ApplicationRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SyncApplicationRequest {
    pub name: String,
    #[serde(default)]
    pub prune: Option<bool>,
    #[serde(default)]
    pub dry_run: Option<bool>,
    #[serde(default)]
    pub revision: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RollbackApplicationRequest {
    pub name: String,
    pub revision: String,
}

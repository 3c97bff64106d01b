//! Routes tool calls to the Argo CD client and renders the results as text.

use rmcp::model::{Content, JsonObject};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::format;
use super::tools::ToolName;
use super::types::*;
use crate::argocd::{ArgoClient, ArgoError, SyncRequest};

/// Why a tool call did not produce a result.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: ToolName, message: String },

    #[error(transparent)]
    Remote(#[from] ArgoError),
}

/// Shared tool dispatcher used by both transports.
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    client: ArgoClient,
}

impl ToolDispatcher {
    pub fn new(client: ArgoClient) -> Self {
        Self { client }
    }

    fn parse<T: DeserializeOwned>(tool: ToolName, arguments: &JsonObject) -> Result<T, ToolError> {
        serde_json::from_value(Value::Object(arguments.clone())).map_err(|e| {
            ToolError::InvalidArguments {
                tool,
                message: e.to_string(),
            }
        })
    }

    /// Run a tool and return its text, or the reason it failed.
    pub async fn call(&self, name: &str, arguments: &JsonObject) -> Result<String, ToolError> {
        let tool: ToolName = name
            .parse()
            .map_err(|_| ToolError::UnknownTool(name.to_string()))?;

        match tool {
            ToolName::ListApplications => {
                let req: ListApplicationsRequest = Self::parse(tool, arguments)?;
                let apps = self
                    .client
                    .list_applications(req.project.as_deref(), req.selector.as_deref())
                    .await?;
                Ok(format::application_list(&apps))
            }
            ToolName::GetApplication => {
                let req: ApplicationRequest = Self::parse(tool, arguments)?;
                let app = self.client.get_application(&req.name).await?;
                Ok(format::pretty(&app))
            }
            ToolName::SyncApplication => {
                let req: SyncApplicationRequest = Self::parse(tool, arguments)?;
                let sync = SyncRequest {
                    prune: req.prune.unwrap_or(false),
                    dry_run: req.dry_run.unwrap_or(false),
                    revision: req.revision,
                };
                let result = self.client.sync_application(&req.name, &sync).await?;
                Ok(format::sync_started(&req.name, &result))
            }
            ToolName::GetApplicationManifests => {
                let req: ApplicationRequest = Self::parse(tool, arguments)?;
                let manifests = self.client.get_application_manifests(&req.name).await?;
                Ok(format::pretty(&manifests))
            }
            ToolName::GetSyncHistory => {
                let req: ApplicationRequest = Self::parse(tool, arguments)?;
                let history = self.client.get_sync_history(&req.name).await?;
                Ok(format::sync_history(&req.name, &history))
            }
            ToolName::RollbackApplication => {
                let req: RollbackApplicationRequest = Self::parse(tool, arguments)?;
                let result = self
                    .client
                    .rollback_application(&req.name, &req.revision)
                    .await?;
                Ok(format::rollback_started(&req.name, &req.revision, &result))
            }
            ToolName::ListProjects => {
                let projects = self.client.list_projects().await?;
                Ok(format::project_list(&projects))
            }
        }
    }

    /// Run a tool and render every outcome as text blocks. Never fails.
    pub async fn dispatch(&self, name: &str, arguments: Option<&JsonObject>) -> Vec<Content> {
        let empty = JsonObject::new();
        let arguments = arguments.unwrap_or(&empty);

        Self::render(name, self.call(name, arguments).await)
    }

    /// [`dispatch`](Self::dispatch) for arguments straight off the wire.
    /// `null` counts as no arguments, anything else that is not an object is
    /// an argument error.
    pub async fn dispatch_value(&self, name: &str, arguments: &Value) -> Vec<Content> {
        match arguments {
            Value::Null => self.dispatch(name, None).await,
            Value::Object(map) => self.dispatch(name, Some(map)).await,
            _ => {
                let error = match name.parse::<ToolName>() {
                    Ok(tool) => ToolError::InvalidArguments {
                        tool,
                        message: "arguments must be a JSON object".to_string(),
                    },
                    Err(()) => ToolError::UnknownTool(name.to_string()),
                };
                Self::render(name, Err(error))
            }
        }
    }

    fn render(name: &str, result: Result<String, ToolError>) -> Vec<Content> {
        let text = match result {
            Ok(text) => {
                tracing::debug!(tool = name, "tool call succeeded");
                text
            }
            Err(e @ ToolError::UnknownTool(_)) => {
                tracing::warn!(tool = name, "unknown tool");
                e.to_string()
            }
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "tool call failed");
                format!("Error: {}", e)
            }
        };

        vec![Content::text(text)]
    }
}

//! The static tool catalog served by `tools/list`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};
use serde_json::{json, Value};

/// Tools exposed to MCP clients.
///
/// `delete_application` and `get_cluster_info` exist on the client but are
/// deliberately not listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ListApplications,
    GetApplication,
    SyncApplication,
    GetApplicationManifests,
    GetSyncHistory,
    RollbackApplication,
    ListProjects,
}

impl ToolName {
    pub const ALL: [ToolName; 7] = [
        ToolName::ListApplications,
        ToolName::GetApplication,
        ToolName::SyncApplication,
        ToolName::GetApplicationManifests,
        ToolName::GetSyncHistory,
        ToolName::RollbackApplication,
        ToolName::ListProjects,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ListApplications => "list_applications",
            ToolName::GetApplication => "get_application",
            ToolName::SyncApplication => "sync_application",
            ToolName::GetApplicationManifests => "get_application_manifests",
            ToolName::GetSyncHistory => "get_sync_history",
            ToolName::RollbackApplication => "rollback_application",
            ToolName::ListProjects => "list_projects",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolName::ListApplications => {
                "List all ArgoCD applications with optional filtering by project or selector"
            }
            ToolName::GetApplication => {
                "Get detailed information about a specific ArgoCD application"
            }
            ToolName::SyncApplication => "Trigger synchronization of an ArgoCD application",
            ToolName::GetApplicationManifests => "Get the Kubernetes manifests for an application",
            ToolName::GetSyncHistory => "Get synchronization history for an application",
            ToolName::RollbackApplication => "Rollback an application to a previous revision",
            ToolName::ListProjects => "List all ArgoCD projects",
        }
    }

    /// JSON schema of the tool's arguments.
    pub fn input_schema(&self) -> Value {
        let name = json!({
            "type": "string",
            "description": "Application name",
        });

        match self {
            ToolName::ListApplications => json!({
                "type": "object",
                "properties": {
                    "project": {
                        "type": "string",
                        "description": "Filter applications by project name",
                    },
                    "selector": {
                        "type": "string",
                        "description": "Filter applications by label selector (e.g., 'app=myapp')",
                    },
                },
            }),
            ToolName::GetApplication
            | ToolName::GetApplicationManifests
            | ToolName::GetSyncHistory => json!({
                "type": "object",
                "properties": { "name": name },
                "required": ["name"],
            }),
            ToolName::SyncApplication => json!({
                "type": "object",
                "properties": {
                    "name": name,
                    "prune": {
                        "type": "boolean",
                        "description": "Prune resources that are no longer in git",
                        "default": false,
                    },
                    "dry_run": {
                        "type": "boolean",
                        "description": "Preview sync without applying changes",
                        "default": false,
                    },
                    "revision": {
                        "type": "string",
                        "description": "Specific git revision to sync to",
                    },
                },
                "required": ["name"],
            }),
            ToolName::RollbackApplication => json!({
                "type": "object",
                "properties": {
                    "name": name,
                    "revision": {
                        "type": "string",
                        "description": "Git revision to rollback to",
                    },
                },
                "required": ["name", "revision"],
            }),
            ToolName::ListProjects => json!({
                "type": "object",
                "properties": {},
            }),
        }
    }

    pub fn to_tool(self) -> Tool {
        let schema = match self.input_schema() {
            Value::Object(map) => map,
            _ => JsonObject::new(),
        };
        Tool::new(self.as_str(), self.description(), Arc::new(schema))
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or(())
    }
}

/// All tool descriptors, in catalog order.
pub fn catalog() -> Vec<Tool> {
    ToolName::ALL.iter().map(|t| t.to_tool()).collect()
}

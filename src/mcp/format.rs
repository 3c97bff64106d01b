//! Text rendering of Argo CD responses for tool results.

use std::fmt::Write;

use serde_json::Value;

const UNKNOWN: &str = "unknown";

/// Read a field by JSON pointer, rendering scalars as text.
///
/// Missing fields, `null`, arrays and objects render as `unknown`.
fn field(value: &Value, pointer: &str) -> String {
    match value.pointer(pointer) {
        Some(Value::String(s)) => s.clone(),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Pretty-printed JSON with two-space indentation.
pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Seven-line summary of one application, each line newline-terminated.
pub fn application_summary(app: &Value) -> String {
    format!(
        "Application: {}\n\
         Namespace: {}\n\
         Repository: {}\n\
         Path: {}\n\
         Revision: {}\n\
         Sync Status: {}\n\
         Health Status: {}\n",
        field(app, "/metadata/name"),
        field(app, "/metadata/namespace"),
        field(app, "/spec/source/repoURL"),
        field(app, "/spec/source/path"),
        field(app, "/spec/source/targetRevision"),
        field(app, "/status/sync/status"),
        field(app, "/status/health/status"),
    )
}

pub fn application_list(apps: &[Value]) -> String {
    if apps.is_empty() {
        return "No applications found".to_string();
    }

    let mut out = format!("Found {} application(s):\n\n", apps.len());
    for app in apps {
        out.push_str(&application_summary(app));
        out.push('\n');
    }
    out
}

pub fn sync_history(name: &str, history: &[Value]) -> String {
    if history.is_empty() {
        return "No sync history found".to_string();
    }

    let mut out = format!("Sync history for {}:\n\n", name);
    for entry in history {
        let _ = write!(
            out,
            "Revision: {}\nDeployed At: {}\n\n",
            field(entry, "/revision"),
            field(entry, "/deployedAt"),
        );
    }
    out
}

pub fn project_list(projects: &[Value]) -> String {
    if projects.is_empty() {
        return "No projects found".to_string();
    }

    let mut out = format!("Found {} project(s):\n\n", projects.len());
    for project in projects {
        let _ = writeln!(out, "- {}", field(project, "/metadata/name"));
    }
    out
}

pub fn sync_started(name: &str, result: &Value) -> String {
    format!("Sync initiated for {}\n\n{}", name, pretty(result))
}

pub fn rollback_started(name: &str, revision: &str, result: &Value) -> String {
    format!(
        "Rollback initiated for {} to revision {}\n\n{}",
        name,
        revision,
        pretty(result)
    )
}

//! HTTP client for the Argo CD REST API.
//!
//! Every method issues a single request against `{base}/api/v1` and returns the
//! decoded JSON body. Response shapes are owned by Argo CD, so results are
//! passed around as `serde_json::Value` rather than typed models.

use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode, Url};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::ArgoConfig;

/// Timeout applied to every Argo CD request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Argo CD client errors.
#[derive(Debug, Error)]
pub enum ArgoError {
    #[error("Argo CD API returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("request to Argo CD timed out after {0:?}")]
    Timeout(Duration),

    #[error("request to Argo CD failed: {}", causes(.0))]
    Transport(#[source] reqwest::Error),

    #[error("invalid JSON in Argo CD response: {}", causes(.0))]
    Decode(#[source] reqwest::Error),

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid Argo CD server URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ArgoError {
    /// HTTP status for API errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ArgoError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ArgoError::Timeout(_))
    }
}

/// An error followed by its source chain, joined with `: `.
///
/// reqwest's top-level message only names the URL; the cause is in the sources.
fn causes(err: &reqwest::Error) -> String {
    let mut out = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !out.contains(&cause_text) {
            out.push_str(": ");
            out.push_str(&cause_text);
        }
        source = std::error::Error::source(cause);
    }
    out
}

/// Body of `POST /applications/{name}/sync`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub prune: bool,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

/// HTTP client for the Argo CD API.
#[derive(Debug, Clone)]
pub struct ArgoClient {
    base_url: Url,
    token: String,
    timeout: Duration,
    client: Client,
}

impl ArgoClient {
    /// Create a client for the configured server.
    pub fn new(config: &ArgoConfig) -> Result<Self, ArgoError> {
        let base = config.api_base_url();
        let base_url = Url::parse(&base).map_err(|e| ArgoError::InvalidUrl {
            url: base.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ArgoError::InvalidUrl {
                url: base,
                reason: "not a hierarchical URL".to_string(),
            });
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(ArgoError::Client)?;

        tracing::debug!(base_url = %base_url, insecure = config.insecure, "Argo CD client ready");

        Ok(Self {
            base_url,
            token: config.token.clone(),
            timeout: REQUEST_TIMEOUT,
            client,
        })
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build `{base}/{segments...}`, percent-encoding each segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base is never cannot-be-a-base.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send one request and decode the JSON response body.
    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value, ArgoError> {
        let url = self.url(segments);
        tracing::debug!(%method, %url, "Argo CD request");

        let mut req = self
            .client
            .request(method.clone(), url)
            .bearer_auth(&self.token)
            .timeout(self.timeout);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req
            .send()
            .await
            .map_err(|e| self.request_error(e, ArgoError::Transport))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%method, %status, "Argo CD request failed");
            return Err(ArgoError::Api { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| self.request_error(e, ArgoError::Decode))
    }

    fn request_error(
        &self,
        err: reqwest::Error,
        otherwise: fn(reqwest::Error) -> ArgoError,
    ) -> ArgoError {
        if err.is_timeout() {
            ArgoError::Timeout(self.timeout)
        } else {
            otherwise(err)
        }
    }

    async fn get(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Value, ArgoError> {
        self.send(Method::GET, segments, query, None).await
    }

    async fn post<B: Serialize>(&self, segments: &[&str], body: &B) -> Result<Value, ArgoError> {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, segments, &[], Some(&body)).await
    }

    // ============================================================
    // Application Operations
    // ============================================================

    /// List applications, optionally filtered by project and label selector.
    pub async fn list_applications(
        &self,
        project: Option<&str>,
        selector: Option<&str>,
    ) -> Result<Vec<Value>, ArgoError> {
        let mut query = Vec::new();
        if let Some(p) = project.filter(|p| !p.is_empty()) {
            query.push(("project", p));
        }
        if let Some(s) = selector.filter(|s| !s.is_empty()) {
            query.push(("selector", s));
        }

        let result = self.get(&["applications"], &query).await?;
        Ok(items(result))
    }

    /// Get an application by name.
    pub async fn get_application(&self, name: &str) -> Result<Value, ArgoError> {
        self.get(&["applications", name], &[]).await
    }

    /// Trigger a sync of an application.
    pub async fn sync_application(
        &self,
        name: &str,
        request: &SyncRequest,
    ) -> Result<Value, ArgoError> {
        let request = SyncRequest {
            revision: request.revision.clone().filter(|r| !r.is_empty()),
            ..request.clone()
        };
        self.post(&["applications", name, "sync"], &request).await
    }

    /// Get the rendered Kubernetes manifests of an application.
    pub async fn get_application_manifests(&self, name: &str) -> Result<Value, ArgoError> {
        self.get(&["applications", name, "manifests"], &[]).await
    }

    /// Sync history, read from `status.history` of the application.
    pub async fn get_sync_history(&self, name: &str) -> Result<Vec<Value>, ArgoError> {
        let app = self.get_application(name).await?;
        Ok(match app.pointer("/status/history") {
            Some(Value::Array(history)) => history.clone(),
            _ => Vec::new(),
        })
    }

    /// Roll an application back to a previous revision.
    pub async fn rollback_application(
        &self,
        name: &str,
        revision: &str,
    ) -> Result<Value, ArgoError> {
        self.post(
            &["applications", name, "rollback"],
            &json!({ "revision": revision }),
        )
        .await
    }

    /// Delete an application.
    pub async fn delete_application(&self, name: &str, cascade: bool) -> Result<Value, ArgoError> {
        let cascade = if cascade { "true" } else { "false" };
        self.send(
            Method::DELETE,
            &["applications", name],
            &[("cascade", cascade)],
            None,
        )
        .await
    }

    // ============================================================
    // Project and Cluster Operations
    // ============================================================

    /// List all projects.
    pub async fn list_projects(&self) -> Result<Vec<Value>, ArgoError> {
        let result = self.get(&["projects"], &[]).await?;
        Ok(items(result))
    }

    /// Clusters known to Argo CD.
    pub async fn get_cluster_info(&self) -> Result<Value, ArgoError> {
        self.get(&["clusters"], &[]).await
    }
}

/// Extract the `items` array of a list response; `null` or absent means empty.
fn items(result: Value) -> Vec<Value> {
    match result {
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server: &str) -> ArgoClient {
        ArgoClient::new(&ArgoConfig {
            server: server.to_string(),
            token: "t".to_string(),
            insecure: false,
        })
        .expect("client")
    }

    #[test]
    fn builds_https_urls_from_host() {
        let c = client("argocd.example.com:8443");
        assert_eq!(
            c.url(&["applications", "web", "sync"]).as_str(),
            "https://argocd.example.com:8443/api/v1/applications/web/sync"
        );
    }

    #[test]
    fn encodes_path_segments() {
        let c = client("argocd.example.com");
        assert_eq!(
            c.url(&["applications", "a/../b"]).as_str(),
            "https://argocd.example.com/api/v1/applications/a%2F..%2Fb"
        );
    }

    #[test]
    fn items_handles_missing_and_null() {
        assert!(items(json!({})).is_empty());
        assert!(items(json!({ "items": null })).is_empty());
        assert_eq!(items(json!({ "items": [{ "a": 1 }] })).len(), 1);
    }

    #[test]
    fn sync_request_serializes_camel_case() {
        let body = serde_json::to_value(SyncRequest {
            prune: true,
            dry_run: false,
            revision: None,
        })
        .unwrap();
        assert_eq!(body, json!({ "prune": true, "dryRun": false }));
    }
}

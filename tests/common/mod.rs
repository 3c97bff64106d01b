//! In-process fake of the Argo CD REST API.
//!
//! Serves canned responses for `(method, path)` pairs under `/api/v1` and
//! records every request it receives.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};

use argocd_mcp::argocd::ArgoClient;
use argocd_mcp::config::ArgoConfig;
use argocd_mcp::mcp::ArgoMcpServer;

pub const TOKEN: &str = "test-token";

/// A request as seen by the fake server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

/// A canned response for one endpoint.
#[derive(Debug, Clone)]
pub struct Route {
    method: Method,
    path: String,
    status: StatusCode,
    body: Value,
    raw: Option<&'static str>,
    delay: Option<Duration>,
}

impl Route {
    fn new(method: Method, path: &str, body: Value) -> Self {
        Self {
            method,
            path: format!("/api/v1{}", path),
            status: StatusCode::OK,
            body,
            raw: None,
            delay: None,
        }
    }

    pub fn get(path: &str, body: Value) -> Self {
        Self::new(Method::GET, path, body)
    }

    pub fn post(path: &str, body: Value) -> Self {
        Self::new(Method::POST, path, body)
    }

    pub fn delete(path: &str, body: Value) -> Self {
        Self::new(Method::DELETE, path, body)
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Respond with a non-JSON body.
    pub fn raw(mut self, body: &'static str) -> Self {
        self.raw = Some(body);
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Clone)]
struct FakeState {
    routes: Arc<Vec<Route>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

async fn handle(
    State(state): State<FakeState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body: serde_json::from_slice(&body).ok(),
    });

    let route = state
        .routes
        .iter()
        .find(|r| r.method == method && r.path == uri.path())
        .cloned();

    match route {
        Some(route) => {
            if let Some(delay) = route.delay {
                tokio::time::sleep(delay).await;
            }
            match route.raw {
                Some(raw) => (route.status, raw).into_response(),
                None => (route.status, Json(route.body)).into_response(),
            }
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not found", "code": 5, "message": "not found" })),
        )
            .into_response(),
    }
}

pub struct FakeArgo {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeArgo {
    pub async fn start(routes: Vec<Route>) -> Self {
        let state = FakeState {
            routes: Arc::new(routes),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let requests = state.requests.clone();
        let app = Router::new().fallback(handle).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Argo CD");
        let addr = listener.local_addr().expect("Failed to read address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake Argo CD failed");
        });

        Self { addr, requests }
    }

    pub fn config(&self) -> ArgoConfig {
        ArgoConfig {
            server: format!("http://{}", self.addr),
            token: TOKEN.to_string(),
            insecure: false,
        }
    }

    pub fn client(&self) -> ArgoClient {
        ArgoClient::new(&self.config()).expect("Failed to create client")
    }

    pub fn mcp_server(&self) -> ArgoMcpServer {
        ArgoMcpServer::new(self.client())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Config pointing at a local port nothing listens on.
pub async fn unreachable_config() -> ArgoConfig {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");
    drop(listener);

    ArgoConfig {
        server: format!("http://{}", addr),
        token: TOKEN.to_string(),
        insecure: false,
    }
}

pub fn application(name: &str, project: &str) -> Value {
    json!({
        "metadata": { "name": name, "namespace": "argocd" },
        "spec": {
            "project": project,
            "source": {
                "repoURL": format!("https://github.com/example/{}.git", name),
                "path": format!("deploy/{}", name),
                "targetRevision": "HEAD",
            },
        },
        "status": {
            "sync": { "status": "Synced" },
            "health": { "status": "Healthy" },
        },
    })
}

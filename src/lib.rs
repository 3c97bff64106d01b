//! MCP server exposing a subset of the Argo CD API as tools, over stdio or HTTP.

pub mod api;
pub mod argocd;
pub mod config;
pub mod mcp;

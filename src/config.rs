//! Process configuration loaded from environment variables.
//!
//! - `ARGOCD_SERVER` - Argo CD host, `host[:port]` or a full `http(s)://` URL (required)
//! - `ARGOCD_TOKEN` - Bearer token for the Argo CD API (required)
//! - `ARGOCD_INSECURE` - `true` to skip TLS certificate verification
//! - `MCP_TRANSPORT` - `stdio` (default) or `http`
//! - `HOST` / `PORT` - HTTP bind address (default `0.0.0.0:8080`)

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Connection settings for the Argo CD API.
#[derive(Clone, PartialEq, Eq)]
pub struct ArgoConfig {
    pub server: String,
    pub token: String,
    pub insecure: bool,
}

impl fmt::Debug for ArgoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgoConfig")
            .field("server", &self.server)
            .field("token", &"<redacted>")
            .field("insecure", &self.insecure)
            .finish()
    }
}

impl ArgoConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = required(&lookup, "ARGOCD_SERVER")?;
        let token = required(&lookup, "ARGOCD_TOKEN")?;
        let insecure = lookup("ARGOCD_INSECURE")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            server,
            token,
            insecure,
        })
    }

    /// Base URL of the REST API, e.g. `https://argocd.example.com/api/v1`.
    ///
    /// A server value that already carries a scheme is used verbatim.
    pub fn api_base_url(&self) -> String {
        let server = self.server.trim_end_matches('/');
        if server.starts_with("http://") || server.starts_with("https://") {
            format!("{}/api/v1", server)
        } else {
            format!("https://{}/api/v1", server)
        }
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// Which JSON-RPC transport the server speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    #[default]
    Stdio,
    Http,
}

impl FromStr for Transport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "http" => Ok(Transport::Http),
            _ => Err(ConfigError::Invalid {
                name: "MCP_TRANSPORT",
                value: s.to_string(),
                reason: "expected 'stdio' or 'http'".to_string(),
            }),
        }
    }
}

/// Transport selection and HTTP bind address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub transport: Transport,
    pub host: String,
    pub port: u16,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl TransportConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let transport = match lookup("MCP_TRANSPORT") {
            Some(v) if !v.trim().is_empty() => v.parse()?,
            _ => Transport::default(),
        };
        if transport == Transport::Stdio {
            return Ok(Self::default());
        }

        let host = lookup("HOST")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("PORT") {
            Some(v) if !v.trim().is_empty() => {
                v.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                    name: "PORT",
                    value: v.clone(),
                    reason: e.to_string(),
                })?
            }
            _ => DEFAULT_PORT,
        };

        Ok(Self {
            transport,
            host,
            port,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

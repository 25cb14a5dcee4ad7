//! Database connection testing.
//!
//! A reachability probe for the source or target database of a migration. It
//! validates that a connection specification is complete and then opens a
//! TCP connection to the endpoint. It never authenticates and never sends
//! SQL; the credentials are only checked for presence.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::{net::TcpStream, time::timeout};
use tracing::{debug, info};

use crate::dialect::Dialect;

/// Connection details of a database endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConnectionSpec {
    pub kind:     Option<Dialect>,
    #[serde(default)]
    pub host:     String,
    #[serde(default)]
    pub port:     String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String
}

impl ConnectionSpec {
    /// Names of required fields that are empty, in declaration order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("host", &self.host),
            ("port", &self.port),
            ("database", &self.database),
            ("username", &self.username),
            ("password", &self.password)
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Outcome of a connection test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>
}

impl ConnectionResult {
    fn ok() -> Self {
        Self {
            success: true,
            message: None
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into())
        }
    }
}

/// Test whether the endpoint in `spec` accepts TCP connections.
///
/// Incomplete specifications fail without touching the network.
pub async fn test_connection(spec: &ConnectionSpec, limit: Duration) -> ConnectionResult {
    let missing = spec.missing_fields();
    if !missing.is_empty() {
        return ConnectionResult::failed(format!(
            "Missing required fields: {}",
            missing.join(", ")
        ));
    }
    let port = match spec.port.trim().parse::<u16>() {
        Ok(port) if port > 0 => port,
        _ => return ConnectionResult::failed(format!("Invalid port '{}'", spec.port))
    };
    let host = spec.host.trim();
    debug!(host, port, kind = ?spec.kind, "probing database endpoint");

    match timeout(limit, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => {
            info!(host, port, "database endpoint reachable");
            ConnectionResult::ok()
        }
        Ok(Err(e)) => ConnectionResult::failed(format!("Connection failed: {}", e)),
        Err(_) => ConnectionResult::failed(format!(
            "Connection failed: timed out after {} ms",
            limit.as_millis()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(host: &str, port: &str) -> ConnectionSpec {
        ConnectionSpec {
            kind:     Some(Dialect::Db2),
            host:     host.to_string(),
            port:     port.to_string(),
            database: "BLUDB".to_string(),
            username: "db2inst1".to_string(),
            password: "secret".to_string()
        }
    }

    #[test]
    fn test_missing_fields() {
        let spec = ConnectionSpec {
            host: "localhost".to_string(),
            ..Default::default()
        };
        assert_eq!(
            spec.missing_fields(),
            vec!["port", "database", "username", "password"]
        );
    }

    #[tokio::test]
    async fn test_missing_fields_fail_without_connecting() {
        let result = test_connection(&ConnectionSpec::default(), Duration::from_secs(1)).await;
        assert!(!result.success);
        assert!(result.message.unwrap().starts_with("Missing required fields: host"));
    }

    #[tokio::test]
    async fn test_invalid_port() {
        let result = test_connection(&spec("localhost", "abc"), Duration::from_secs(1)).await;
        assert_eq!(result.message.as_deref(), Some("Invalid port 'abc'"));
    }

    #[tokio::test]
    async fn test_reachable_endpoint() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let result =
            test_connection(&spec("127.0.0.1", &port.to_string()), Duration::from_secs(5)).await;
        assert!(result.success);
        assert!(result.message.is_none());
    }

    #[tokio::test]
    async fn test_closed_port() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let result =
            test_connection(&spec("127.0.0.1", &port.to_string()), Duration::from_secs(5)).await;
        assert!(!result.success);
        assert!(result.message.unwrap().starts_with("Connection failed"));
    }
}

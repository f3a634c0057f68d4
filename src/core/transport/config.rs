//! HTTP listener configuration.

use serde::{Deserialize, Serialize};

/// HTTP transport configuration.
///
/// `host` and `port` sit at the top level of the YAML configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Host address to bind to.
    pub host: String,

    /// Port number to listen on.
    pub port: u16,

    /// Route serving file reads.
    pub read_path: String,

    /// Enable CORS for browser clients.
    pub enable_cors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_read_path() -> String {
    "/file".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 8080,
            read_path: default_read_path(),
            enable_cors: false,
        }
    }
}

impl HttpConfig {
    /// Create a config listening on `host:port` with default routes.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        format!("HTTP on {}{}", self.address(), self.read_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_and_description() {
        let config = HttpConfig::new("0.0.0.0", 55000);
        assert_eq!(config.address(), "0.0.0.0:55000");
        assert_eq!(config.description(), "HTTP on 0.0.0.0:55000/file");
    }
}

//! Configuration for Sockden
//!
//! TOML-backed configuration: a `[server]` section for the listener and
//! handshake policy, plus a `[users]` table backing the default password
//! checker.

use crate::error::{Result, SockdenError};
use crate::socks::{AuthMethod, PasswordChecker};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        SockdenError::Config(format!(
            "failed to read config file {:?}: {}",
            path.as_ref(),
            e
        ))
    })?;

    parse_config(&content)
}

/// Parse configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content)
        .map_err(|e| SockdenError::Config(format!("failed to parse configuration: {}", e)))
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server section
    #[serde(default)]
    pub server: ServerConfig,

    /// Username to password table for the default checker
    #[serde(default)]
    pub users: HashMap<String, String>,
}

/// SOCKS5 server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the listener binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Authentication method required from clients
    #[serde(default = "default_auth")]
    pub auth: AuthMethod,

    /// Dial timeout toward targets, in seconds
    #[serde(default = "default_tcp_timeout")]
    pub tcp_timeout: u64,
}

/// Default bind address
fn default_bind_addr() -> String {
    "127.0.0.1:1080".to_string()
}

/// Default authentication method
fn default_auth() -> AuthMethod {
    AuthMethod::None
}

/// Default dial timeout in seconds
fn default_tcp_timeout() -> u64 {
    5
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            auth: default_auth(),
            tcp_timeout: default_tcp_timeout(),
        }
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.auth == AuthMethod::Password && self.users.is_empty() {
            return Err(SockdenError::Config(
                "password authentication requires at least one entry in [users]".to_string(),
            ));
        }
        Ok(())
    }

    /// Build a password checker backed by the `[users]` table.
    ///
    /// The table is captured in a shared read-only map, so the checker can
    /// run from any number of connection tasks without locking.
    pub fn password_checker(&self) -> PasswordChecker {
        let users = Arc::new(self.users.clone());
        Arc::new(move |username: &str, password: &str| {
            users
                .get(username)
                .map(|want| want.as_str() == password)
                .unwrap_or(false)
        })
    }
}

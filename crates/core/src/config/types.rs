use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub desk: DeskConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("servicedesk.db")
}

/// Client-side desk configuration (remote store and local cache behaviour).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeskConfig {
    /// Base URL of the remote collection endpoints.
    #[serde(default = "default_remote_url")]
    pub remote_url: String,
    /// Re-fetch a collection after every confirmed write.
    #[serde(default = "default_true")]
    pub reconcile_after_write: bool,
    /// Flag orders whose target date has passed.
    #[serde(default = "default_true")]
    pub overdue_highlight: bool,
    /// JSON file holding the local cache between sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<PathBuf>,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            remote_url: default_remote_url(),
            reconcile_after_write: true,
            overdue_highlight: true,
            cache_path: None,
        }
    }
}

fn default_remote_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_true() -> bool {
    true
}

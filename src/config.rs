//! Application configuration loaded from environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::Deserialize;

/// Fallback database and collection name.
pub const DEFAULT_NAMESPACE: &str = "consoles";

/// Log output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Storage ===
    /// MongoDB connection string.
    pub mongodb_uri: String,

    /// Database name. Falls back to the database named in the URI.
    #[serde(default)]
    pub mongodb_database: Option<String>,

    /// Collection holding console documents.
    #[serde(default = "default_collection")]
    pub mongodb_collection: String,

    // === Server Configuration ===
    /// HTTP bind address.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Log output encoding.
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_collection() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3002
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Build a config pointing at the given URI with every other field defaulted.
    pub fn with_uri(uri: impl Into<String>) -> Self {
        Self {
            mongodb_uri: uri.into(),
            mongodb_database: None,
            mongodb_collection: default_collection(),
            host: default_host(),
            port: default_port(),
            rust_log: default_log_level(),
            log_format: LogFormat::default(),
        }
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.mongodb_uri.trim().is_empty() {
            return Err("MONGODB_URI is required".to_string());
        }

        if !self.mongodb_uri.starts_with("mongodb://")
            && !self.mongodb_uri.starts_with("mongodb+srv://")
        {
            return Err("MONGODB_URI must start with mongodb:// or mongodb+srv://".to_string());
        }

        if self.mongodb_collection.trim().is_empty() {
            return Err("MONGODB_COLLECTION must not be empty".to_string());
        }

        if self.port == 0 {
            return Err("PORT must be non-zero".to_string());
        }

        Ok(())
    }

    /// Socket address the HTTP server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Database to use: explicit setting, then the URI path, then [`DEFAULT_NAMESPACE`].
    pub fn database_name(&self) -> String {
        self.mongodb_database
            .clone()
            .filter(|name| !name.is_empty())
            .or_else(|| database_from_uri(&self.mongodb_uri))
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
    }

    /// Connection string with any password replaced, safe for logs.
    pub fn redacted_uri(&self) -> String {
        let Some((scheme, rest)) = self.mongodb_uri.split_once("://") else {
            return self.mongodb_uri.clone();
        };
        match rest.split_once('@') {
            Some((credentials, host)) => {
                let user = credentials.split(':').next().unwrap_or_default();
                format!("{scheme}://{user}:****@{host}")
            }
            None => self.mongodb_uri.clone(),
        }
    }
}

/// Extract the database segment of a MongoDB URI (`mongodb://host/<db>?opts`).
fn database_from_uri(uri: &str) -> Option<String> {
    let (_, rest) = uri.split_once("://")?;
    let (_, path) = rest.split_once('/')?;
    let name = path.split('?').next().unwrap_or_default();
    (!name.is_empty()).then(|| name.to_string())
}

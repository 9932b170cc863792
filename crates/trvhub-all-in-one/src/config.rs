use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // HTTP server
    #[serde(default = "default_http_host")]
    pub http_host: String,

    #[serde(default = "default_http_port")]
    pub http_port: u16,

    // Document store. Credentials have no defaults on purpose: a missing
    // value fails startup instead of failing requests later.
    pub couchdb_url: String,

    pub couchdb_username: String,

    pub couchdb_password: String,

    #[serde(default = "default_couchdb_retry_attempts")]
    pub couchdb_retry_attempts: u32,

    #[serde(default = "default_couchdb_retry_backoff_ms")]
    pub couchdb_retry_backoff_ms: u64,

    // Hardware gateway
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    // Auth
    pub jwt_secret: String,

    #[serde(default = "default_jwt_expiration_hours")]
    pub jwt_expiration_hours: u64,

    // Background discovery
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_couchdb_retry_attempts() -> u32 {
    3
}

fn default_couchdb_retry_backoff_ms() -> u64 {
    500
}

fn default_gateway_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_jwt_expiration_hours() -> u64 {
    24
}

fn default_poll_interval_secs() -> u64 {
    60
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("TRVHUB"))
            .build()?
            .try_deserialize()
    }
}

use serde::{Deserialize, Serialize};

/// Document store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    /// Connection-level retry attempts for transport failures
    pub retry_attempts: u32,
    /// Backoff between retry attempts, in milliseconds
    pub retry_backoff_ms: u64,
}

impl Default for CouchConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5984".to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            retry_attempts: 3,
            retry_backoff_ms: 500,
        }
    }
}

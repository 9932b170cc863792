use crate::couch::config::CouchConfig;
use crate::couch::store::Database;
use crate::domain::{DomainError, DomainResult};
use reqwest::{Method, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for a CouchDB-style document store.
///
/// Holds the connection settings and applies the configured
/// connection-level retry to transport failures. HTTP status handling is
/// left to the callers; only failures to reach the store are retried.
#[derive(Clone)]
pub struct CouchClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    retry_attempts: u32,
    retry_backoff: Duration,
}

impl CouchClient {
    pub fn new(config: CouchConfig) -> DomainResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| DomainError::Upstream(format!("building store client failed: {}", err)))?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username,
            password: config.password,
            retry_attempts: config.retry_attempts.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    /// Pings the store to verify connectivity
    pub async fn ping(&self) -> DomainResult<()> {
        let response = self.execute(self.request(Method::GET, "_up")).await?;
        if response.status().is_success() {
            debug!("document store connection successful");
            Ok(())
        } else {
            Err(DomainError::Upstream(format!(
                "document store ping returned {}",
                response.status()
            )))
        }
    }

    /// Ensures the named database exists and returns a handle to it
    pub async fn database(&self, name: &str) -> DomainResult<Database> {
        let response = self.execute(self.request(Method::PUT, name)).await?;
        match response.status() {
            // 412 means the database is already there
            StatusCode::CREATED | StatusCode::PRECONDITION_FAILED => {
                debug!(database = name, "database ready");
                Ok(Database::new(self.clone(), name.to_string()))
            }
            status => Err(DomainError::Upstream(format!(
                "creating database {} returned {}",
                name, status
            ))),
        }
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        self.http
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
    }

    /// Sends a request, retrying transport failures with the configured
    /// attempt count and backoff. HTTP error statuses are not retried.
    pub(crate) async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> DomainResult<reqwest::Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let current = request.try_clone().ok_or_else(|| {
                DomainError::Upstream("store request body cannot be replayed".to_string())
            })?;

            match current.send().await {
                Ok(response) => return Ok(response),
                Err(err) if attempt < self.retry_attempts => {
                    warn!(
                        "document store request failed (attempt {}/{}): {}",
                        attempt, self.retry_attempts, err
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(err) => {
                    return Err(DomainError::Upstream(format!(
                        "document store unreachable: {}",
                        err
                    )))
                }
            }
        }
    }
}

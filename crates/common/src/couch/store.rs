use crate::couch::client::CouchClient;
use crate::domain::{DomainError, DomainResult};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// An entity that can live in a document store database. The public
/// identifier doubles as the storage key, so the storage-specific key
/// never becomes visible to API consumers.
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    fn document_id(&self) -> &str;
}

/// Storage envelope around an entity. `_id` and `_rev` are bookkeeping
/// fields of the store; they are stripped before a document is returned.
#[derive(Debug, Serialize, Deserialize)]
struct CouchDocument<T> {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    rev: Option<String>,
    #[serde(flatten)]
    body: T,
}

#[derive(Debug, Deserialize)]
struct RevisionProbe {
    #[serde(rename = "_rev")]
    rev: String,
}

#[derive(Debug, Deserialize)]
struct AllDocsResponse<T> {
    rows: Vec<AllDocsRow<T>>,
}

#[derive(Debug, Deserialize)]
struct AllDocsRow<T> {
    id: String,
    doc: Option<CouchDocument<T>>,
}

/// Handle to one database, exposing uniform document operations.
///
/// Updates and deletes read the document immediately before writing to
/// obtain the latest revision token. This is optimistic concurrency: two
/// racing writers are not serialized, the loser gets a `Conflict`.
#[derive(Clone)]
pub struct Database {
    client: CouchClient,
    name: String,
}

impl Database {
    pub(crate) fn new(client: CouchClient, name: String) -> Self {
        Self { client, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn doc_path(&self, id: &str) -> String {
        format!("{}/{}", self.name, id)
    }

    /// Insert a new document under its public identifier
    pub async fn create<T: Document>(&self, document: T) -> DomainResult<T> {
        let id = document.document_id().to_string();
        let envelope = CouchDocument {
            id: Some(id.clone()),
            rev: None,
            body: document,
        };

        let request = self
            .client
            .request(Method::PUT, &self.doc_path(&id))
            .json(&envelope);
        let response = self.client.execute(request).await?;

        match response.status() {
            StatusCode::CREATED | StatusCode::ACCEPTED => {
                debug!(document_id = %id, database = %self.name, "document created");
                Ok(envelope.body)
            }
            StatusCode::CONFLICT => Err(DomainError::Conflict(format!(
                "document {} already exists in {}",
                id, self.name
            ))),
            status => Err(self.unexpected("create", &id, status)),
        }
    }

    /// Fetch a document by identifier, stripping storage bookkeeping
    pub async fn get<T: Document>(&self, id: &str) -> DomainResult<T> {
        let request = self.client.request(Method::GET, &self.doc_path(id));
        let response = self.client.execute(request).await?;

        match response.status() {
            StatusCode::OK => {
                let document: CouchDocument<T> = response
                    .json()
                    .await
                    .map_err(|err| decode_error(&self.name, err))?;
                Ok(document.body)
            }
            StatusCode::NOT_FOUND => Err(DomainError::NotFound(format!(
                "document {} not found in {}",
                id, self.name
            ))),
            status => Err(self.unexpected("get", id, status)),
        }
    }

    /// Fetch every document in the database; empty is a valid result
    pub async fn get_all<T: Document>(&self) -> DomainResult<Vec<T>> {
        let request = self
            .client
            .request(Method::GET, &format!("{}/_all_docs", self.name))
            .query(&[("include_docs", "true")]);
        let response = self.client.execute(request).await?;

        match response.status() {
            StatusCode::OK => {
                let all: AllDocsResponse<T> = response
                    .json()
                    .await
                    .map_err(|err| decode_error(&self.name, err))?;
                let documents = all
                    .rows
                    .into_iter()
                    .filter(|row| !row.id.starts_with("_design/"))
                    .filter_map(|row| row.doc)
                    .map(|document| document.body)
                    .collect();
                Ok(documents)
            }
            status => Err(self.unexpected("get_all", "_all_docs", status)),
        }
    }

    /// Replace a stored document in full, stamping the latest revision
    /// token read immediately before the write
    pub async fn update<T: Document>(&self, document: T) -> DomainResult<T> {
        let id = document.document_id().to_string();
        let rev = self.current_revision(&id).await?;

        let envelope = CouchDocument {
            id: Some(id.clone()),
            rev: Some(rev),
            body: document,
        };

        let request = self
            .client
            .request(Method::PUT, &self.doc_path(&id))
            .json(&envelope);
        let response = self.client.execute(request).await?;

        match response.status() {
            StatusCode::CREATED | StatusCode::ACCEPTED => {
                debug!(document_id = %id, database = %self.name, "document updated");
                Ok(envelope.body)
            }
            StatusCode::CONFLICT => Err(DomainError::Conflict(format!(
                "lost concurrent update of document {} in {}",
                id, self.name
            ))),
            status => Err(self.unexpected("update", &id, status)),
        }
    }

    /// Delete a document by identifier. The read for the revision token
    /// happens first; if it finds nothing the destroy call is never issued.
    pub async fn delete(&self, id: &str) -> DomainResult<()> {
        let rev = self.current_revision(id).await?;

        let request = self
            .client
            .request(Method::DELETE, &self.doc_path(id))
            .query(&[("rev", rev.as_str())]);
        let response = self.client.execute(request).await?;

        match response.status() {
            StatusCode::OK | StatusCode::ACCEPTED => {
                debug!(document_id = %id, database = %self.name, "document deleted");
                Ok(())
            }
            StatusCode::CONFLICT => Err(DomainError::Conflict(format!(
                "lost concurrent delete of document {} in {}",
                id, self.name
            ))),
            StatusCode::NOT_FOUND => Err(DomainError::NotFound(format!(
                "document {} not found in {}",
                id, self.name
            ))),
            status => Err(self.unexpected("delete", id, status)),
        }
    }

    async fn current_revision(&self, id: &str) -> DomainResult<String> {
        let request = self.client.request(Method::GET, &self.doc_path(id));
        let response = self.client.execute(request).await?;

        match response.status() {
            StatusCode::OK => {
                let probe: RevisionProbe = response
                    .json()
                    .await
                    .map_err(|err| decode_error(&self.name, err))?;
                Ok(probe.rev)
            }
            StatusCode::NOT_FOUND => Err(DomainError::NotFound(format!(
                "document {} not found in {}",
                id, self.name
            ))),
            status => Err(self.unexpected("revision read", id, status)),
        }
    }

    fn unexpected(&self, operation: &str, id: &str, status: StatusCode) -> DomainError {
        DomainError::Upstream(format!(
            "document store {} of {} in {} returned {}",
            operation, id, self.name, status
        ))
    }
}

fn decode_error(database: &str, err: reqwest::Error) -> DomainError {
    DomainError::Upstream(format!(
        "invalid document store response from {}: {}",
        database, err
    ))
}

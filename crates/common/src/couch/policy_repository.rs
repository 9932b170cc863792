use crate::couch::client::CouchClient;
use crate::couch::store::{Database, Document};
use crate::domain::{DomainError, DomainResult, Policy, PolicyDraft, PolicyRepository};
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

const POLICIES_DB: &str = "policies";

impl Document for Policy {
    fn document_id(&self) -> &str {
        &self.id
    }
}

/// Document store implementation of PolicyRepository
pub struct CouchPolicyRepository {
    client: CouchClient,
    db: OnceCell<Result<Database, String>>,
}

impl CouchPolicyRepository {
    pub fn new(client: CouchClient) -> Self {
        Self {
            client,
            db: OnceCell::new(),
        }
    }

    // Sticky lazy initialization, same contract as the device repository.
    async fn db(&self) -> DomainResult<&Database> {
        let result = self
            .db
            .get_or_init(|| async {
                self.client
                    .database(POLICIES_DB)
                    .await
                    .map_err(|err| err.to_string())
            })
            .await;

        match result {
            Ok(db) => Ok(db),
            Err(message) => Err(DomainError::Initialization(message.clone())),
        }
    }
}

#[async_trait]
impl PolicyRepository for CouchPolicyRepository {
    #[instrument(skip(self, draft), fields(policy_name = %draft.name))]
    async fn create_policy(&self, draft: PolicyDraft) -> DomainResult<Policy> {
        let db = self.db().await?;

        let policy = Policy {
            id: xid::new().to_string(),
            name: draft.name,
            spans: draft.spans,
            user_id: draft.user_id,
        };

        let policy = db.create(policy).await?;
        debug!(policy_id = %policy.id, "created policy");
        Ok(policy)
    }

    #[instrument(skip(self))]
    async fn get_policy(&self, policy_id: &str) -> DomainResult<Policy> {
        let db = self.db().await?;
        db.get(policy_id).await
    }

    #[instrument(skip(self))]
    async fn list_policies(&self) -> DomainResult<Vec<Policy>> {
        let db = self.db().await?;
        let policies: Vec<Policy> = db.get_all().await?;
        debug!(count = policies.len(), "listed policies");
        Ok(policies)
    }

    #[instrument(skip(self, policy), fields(policy_id = %policy.id))]
    async fn update_policy(&self, policy: Policy) -> DomainResult<Policy> {
        let db = self.db().await?;
        db.update(policy).await
    }

    #[instrument(skip(self))]
    async fn delete_policy(&self, policy_id: &str) -> DomainResult<()> {
        let db = self.db().await?;
        db.delete(policy_id).await?;
        debug!(policy_id = %policy_id, "deleted policy");
        Ok(())
    }
}

use common::{DomainResult, Policy, PolicyDraft, PolicyRepository, PolicySpan};
use garde::Validate;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Service request for creating a heating policy
#[derive(Debug, Clone, Validate)]
pub struct CreatePolicyRequest {
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(length(min = 1))]
    pub user_id: String,
    #[garde(length(min = 1))]
    pub spans: Vec<PolicySpan>,
}

/// Service request for replacing a heating policy
#[derive(Debug, Clone, Validate)]
pub struct UpdatePolicyRequest {
    #[garde(length(min = 1))]
    pub policy_id: String,
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(length(min = 1))]
    pub user_id: String,
    #[garde(length(min = 1))]
    pub spans: Vec<PolicySpan>,
}

/// Domain service for heating-policy management
pub struct PolicyService {
    policy_repository: Arc<dyn PolicyRepository>,
}

impl PolicyService {
    pub fn new(policy_repository: Arc<dyn PolicyRepository>) -> Self {
        Self { policy_repository }
    }

    #[instrument(skip(self, request), fields(policy_name = %request.name))]
    pub async fn create_policy(&self, request: CreatePolicyRequest) -> DomainResult<Policy> {
        common::garde::validate(&request)?;

        let policy = self
            .policy_repository
            .create_policy(PolicyDraft {
                name: request.name,
                spans: request.spans,
                user_id: request.user_id,
            })
            .await?;

        debug!(policy_id = %policy.id, "policy created");
        Ok(policy)
    }

    #[instrument(skip(self))]
    pub async fn get_policy(&self, policy_id: &str) -> DomainResult<Policy> {
        self.policy_repository.get_policy(policy_id).await
    }

    #[instrument(skip(self))]
    pub async fn list_policies(&self) -> DomainResult<Vec<Policy>> {
        self.policy_repository.list_policies().await
    }

    #[instrument(skip(self, request), fields(policy_id = %request.policy_id))]
    pub async fn update_policy(&self, request: UpdatePolicyRequest) -> DomainResult<Policy> {
        common::garde::validate(&request)?;

        self.policy_repository
            .update_policy(Policy {
                id: request.policy_id,
                name: request.name,
                spans: request.spans,
                user_id: request.user_id,
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_policy(&self, policy_id: &str) -> DomainResult<()> {
        self.policy_repository.delete_policy(policy_id).await
    }
}

use crate::domain::result::DomainResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One heating window: a start/end time pair and the temperature to hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySpan {
    pub start: String,
    pub end: String,
    pub target_temperature: f64,
}

/// A heating policy owned by a user, with ordered heating windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: String,
    pub name: String,
    pub spans: Vec<PolicySpan>,
    pub user_id: String,
}

/// Input for creating a policy; the repository assigns the identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDraft {
    pub name: String,
    pub spans: Vec<PolicySpan>,
    pub user_id: String,
}

/// Repository trait for heating-policy storage operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PolicyRepository: Send + Sync {
    /// Create a new policy, assigning a unique identifier
    async fn create_policy(&self, draft: PolicyDraft) -> DomainResult<Policy>;

    /// Fetch a policy by identifier
    async fn get_policy(&self, policy_id: &str) -> DomainResult<Policy>;

    /// List every policy; an empty list is not an error
    async fn list_policies(&self) -> DomainResult<Vec<Policy>>;

    /// Replace a stored policy in full
    async fn update_policy(&self, policy: Policy) -> DomainResult<Policy>;

    /// Remove a policy
    async fn delete_policy(&self, policy_id: &str) -> DomainResult<()>;
}

use crate::domain::result::DomainResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Credentials a user holds for their own hardware gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayCredentials {
    pub username: String,
    pub password: String,
}

/// User domain entity. The email is the login identifier; only the
/// password hash is ever stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_credentials: Option<GatewayCredentials>,
}

/// Input for registering a user (password already hashed by the domain
/// service); the repository assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub address: Option<String>,
    pub gateway_credentials: Option<GatewayCredentials>,
}

/// Repository trait for user storage operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Register a new user, assigning a unique identifier
    async fn register_user(&self, input: NewUser) -> DomainResult<User>;

    /// Fetch a user by identifier
    async fn get_user(&self, user_id: &str) -> DomainResult<User>;

    /// Look up a user by email; absence is a normal outcome during login
    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Replace a stored user in full
    async fn update_user(&self, user: User) -> DomainResult<User>;

    /// Remove a user
    async fn delete_user(&self, user_id: &str) -> DomainResult<()>;
}

use crate::couch::client::CouchClient;
use crate::couch::store::{Database, Document};
use crate::domain::{DomainError, DomainResult, NewUser, User, UserRepository};
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

const USERS_DB: &str = "users";

impl Document for User {
    fn document_id(&self) -> &str {
        &self.id
    }
}

/// Document store implementation of UserRepository
pub struct CouchUserRepository {
    client: CouchClient,
    db: OnceCell<Result<Database, String>>,
}

impl CouchUserRepository {
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
                    .database(USERS_DB)
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
impl UserRepository for CouchUserRepository {
    #[instrument(skip(self, input), fields(email = %input.email))]
    async fn register_user(&self, input: NewUser) -> DomainResult<User> {
        let db = self.db().await?;

        let user = User {
            id: xid::new().to_string(),
            email: input.email,
            name: input.name,
            password_hash: input.password_hash,
            address: input.address,
            gateway_credentials: input.gateway_credentials,
        };

        let user = db.create(user).await?;
        debug!(user_id = %user.id, "registered user");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: &str) -> DomainResult<User> {
        let db = self.db().await?;
        db.get(user_id).await
    }

    // The store keeps no secondary index; the login lookup scans the
    // collection. Acceptable at this system's scale.
    #[instrument(skip(self, email))]
    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let db = self.db().await?;
        let users: Vec<User> = db.get_all().await?;
        Ok(users.into_iter().find(|user| user.email == email))
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update_user(&self, user: User) -> DomainResult<User> {
        let db = self.db().await?;
        db.update(user).await
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: &str) -> DomainResult<()> {
        let db = self.db().await?;
        db.delete(user_id).await?;
        debug!(user_id = %user_id, "deleted user");
        Ok(())
    }
}

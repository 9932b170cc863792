use common::{
    AuthTokenProvider, DomainError, DomainResult, GatewayCredentials, NewUser, PasswordService,
    User, UserRepository,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// External input for registering a user (plaintext password)
#[derive(Debug, Clone)]
pub struct RegisterUserInput {
    pub email: String,
    pub password: String,
    pub name: String,
    pub address: Option<String>,
    pub gateway_credentials: Option<GatewayCredentials>,
}

/// Input for updating a user. A `None` password keeps the stored hash.
#[derive(Debug, Clone)]
pub struct UpdateUserInput {
    pub user_id: String,
    pub name: String,
    pub address: Option<String>,
    pub password: Option<String>,
    pub gateway_credentials: Option<GatewayCredentials>,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginOutput {
    pub access_token: String,
}

/// Domain service for user registration, login and management
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    auth_token_provider: Arc<dyn AuthTokenProvider>,
    password_service: Arc<dyn PasswordService>,
}

impl UserService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        auth_token_provider: Arc<dyn AuthTokenProvider>,
        password_service: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            user_repository,
            auth_token_provider,
            password_service,
        }
    }

    /// Register a new user with a hashed password
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register_user(&self, input: RegisterUserInput) -> DomainResult<User> {
        if !Self::is_valid_email(&input.email) {
            return Err(DomainError::BadRequest("Invalid email format".to_string()));
        }

        if input.password.len() < 8 {
            return Err(DomainError::BadRequest(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if input.name.trim().is_empty() {
            return Err(DomainError::BadRequest("Name cannot be empty".to_string()));
        }

        let password_hash = self.password_service.hash_password(&input.password)?;

        let user = self
            .user_repository
            .register_user(NewUser {
                email: input.email,
                name: input.name,
                password_hash,
                address: input.address,
                gateway_credentials: input.gateway_credentials,
            })
            .await?;

        debug!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Login and generate an access token. Unknown emails and wrong
    /// passwords are indistinguishable to the caller.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login_user(&self, input: LoginInput) -> DomainResult<LoginOutput> {
        if !Self::is_valid_email(&input.email) {
            return Err(DomainError::InvalidCredentials);
        }

        let user = self
            .user_repository
            .get_user_by_email(&input.email)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        if !self
            .password_service
            .verify_password(&input.password, &user.password_hash)?
        {
            return Err(DomainError::InvalidCredentials);
        }

        let access_token = self
            .auth_token_provider
            .generate_token(&user.id, &user.email)?;

        debug!(user_id = %user.id, "user login successful");
        Ok(LoginOutput { access_token })
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: &str) -> DomainResult<User> {
        self.user_repository.get_user(user_id).await
    }

    /// Replace a stored user. The email stays fixed (it is the login
    /// identifier); the password is re-hashed only when a new one is
    /// supplied.
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn update_user(&self, input: UpdateUserInput) -> DomainResult<User> {
        if input.name.trim().is_empty() {
            return Err(DomainError::BadRequest("Name cannot be empty".to_string()));
        }

        let current = self.user_repository.get_user(&input.user_id).await?;

        let password_hash = match input.password {
            Some(password) => {
                if password.len() < 8 {
                    return Err(DomainError::BadRequest(
                        "Password must be at least 8 characters".to_string(),
                    ));
                }
                self.password_service.hash_password(&password)?
            }
            None => current.password_hash,
        };

        let user = User {
            id: current.id,
            email: current.email,
            name: input.name,
            password_hash,
            address: input.address,
            gateway_credentials: input.gateway_credentials,
        };

        self.user_repository.update_user(user).await
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: &str) -> DomainResult<()> {
        self.user_repository.delete_user(user_id).await
    }

    /// Basic email validation
    fn is_valid_email(email: &str) -> bool {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() != 2 {
            return false;
        }
        let domain = parts[1];
        domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    }
}

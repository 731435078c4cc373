use std::sync::Arc;

use async_trait::async_trait;
use audit::LogSink;
use auth::Authenticator;

use crate::domain::user::models::IssuedToken;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for account operations.
///
/// Password hashing and verification are CPU-bound and run on the blocking
/// thread pool.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    log: LogSink,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Account persistence implementation
    /// * `authenticator` - Password hashing and token issuance
    /// * `log` - Audit log sink
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>, log: LogSink) -> Self {
        Self {
            repository,
            authenticator,
            log,
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, UserError> {
        let authenticator = Arc::clone(&self.authenticator);
        let hash = tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await??;
        Ok(hash)
    }

    async fn verify_decoy(&self, password: String) -> Result<(), UserError> {
        let authenticator = Arc::clone(&self.authenticator);
        tokio::task::spawn_blocking(move || authenticator.verify_decoy(&password)).await?;
        Ok(())
    }

    async fn authenticate(&self, password: String, user: &User) -> Result<String, UserError> {
        let authenticator = Arc::clone(&self.authenticator);
        let stored_hash = user.password_hash.clone();
        let email = user.email.to_string();
        let user_id = user.id.as_i64();

        let result = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(&password, &stored_hash, user_id, &email)
        })
        .await??;

        Ok(result.access_token)
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<IssuedToken, UserError> {
        let existing = self
            .repository
            .find_by_email(command.email.as_str())
            .await
            .inspect_err(|e| audit::error!(self.log, "Failed to check existing user: {}", e))?;

        if existing.is_some() {
            audit::warn!(self.log, "Registration rejected: email already registered");
            return Err(UserError::EmailAlreadyExists(command.email.to_string()));
        }

        let password_hash = self
            .hash_password(command.password)
            .await
            .inspect_err(|e| audit::error!(self.log, "Failed to hash password: {}", e))?;

        let user = match self
            .repository
            .create(NewUser {
                email: command.email,
                password_hash,
            })
            .await
        {
            Ok(user) => user,
            Err(e @ UserError::EmailAlreadyExists(_)) => {
                audit::warn!(self.log, "Registration rejected: email registered concurrently");
                return Err(e);
            }
            Err(e) => {
                audit::error!(self.log, "Failed to create user: {}", e);
                return Err(e);
            }
        };

        let token = self
            .authenticator
            .issue_token(user.id.as_i64(), user.email.as_str())
            .inspect_err(|e| audit::error!(self.log, "Failed to issue token: {}", e))?;

        audit::info!(self.log, "Registered user with ID: {}", user.id);

        Ok(IssuedToken {
            user_id: user.id,
            token,
        })
    }

    async fn login(&self, command: LoginCommand) -> Result<IssuedToken, UserError> {
        let found = self
            .repository
            .find_by_email(&command.email)
            .await
            .inspect_err(|e| audit::error!(self.log, "Failed to look up user: {}", e))?;

        let Some(user) = found else {
            self.verify_decoy(command.password).await?;
            audit::warn!(self.log, "Login failed: unknown email");
            return Err(UserError::InvalidCredentials);
        };

        match self.authenticate(command.password, &user).await {
            Ok(token) => {
                audit::info!(self.log, "User {} logged in", user.id);
                Ok(IssuedToken {
                    user_id: user.id,
                    token,
                })
            }
            Err(UserError::InvalidCredentials) => {
                audit::warn!(self.log, "Login failed: wrong password for user {}", user.id);
                Err(UserError::InvalidCredentials)
            }
            Err(e) => {
                audit::error!(self.log, "Login failed for user {}: {}", user.id, e);
                Err(e)
            }
        }
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }
}

//! Service used to register accounts and open sessions.

use std::sync::Arc;

use log::{debug, info};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::SessionKeys;
use crate::models::user::{LoginRequest, NewUser, RegisterRequest, RegisteredUser};
use crate::repositories::{Repositories, UserRepository};
use crate::Error;

/// Service implementation for user accounts.
#[derive(Clone)]
pub struct Service {
    users: Arc<dyn UserRepository>,
    session_keys: SessionKeys,
}

impl Service {
    /// Creates a new user service using the provided storage accessors and session keys.
    pub fn new(repositories: &Repositories, session_keys: SessionKeys) -> Self {
        Self { users: repositories.users.clone(), session_keys }
    }

    /// Registers a new account.
    ///
    /// Fails with [`Error::DuplicateUsername`] if the username is taken.
    pub async fn register(&self, request: &RegisterRequest) -> crate::Result<RegisteredUser> {
        require_credentials(&request.username, &request.password)?;

        match self.users.get_user_by_username(&request.username).await {
            Ok(_) => {
                return Err(Error::DuplicateUsername { username: request.username.clone() });
            },
            Err(error) if error.is_not_found() => (),
            Err(error) => return Err(error),
        }

        let new_user = NewUser {
            username: request.username.clone(),
            email: request.email.clone(),
            password_hash: hash_password(&request.password)?,
            role: request.role,
        };
        let id = self.users.create_user(new_user).await?;
        info!("Registered user {} ({}) as {}", request.username, id, request.role);

        Ok(RegisteredUser { id })
    }

    /// Checks credentials and returns a new session token.
    ///
    /// An unknown user is reported by the accessor as not found; a wrong password is reported
    /// as [`Error::InvalidCredentials`].
    pub async fn login(&self, request: &LoginRequest) -> crate::Result<String> {
        require_credentials(&request.username, &request.password)?;

        let user = self.users.get_user_by_username(&request.username).await?;
        if !verify_password(&request.password, &user.password_hash) {
            debug!("Wrong password for user {}", user.username);
            return Err(Error::InvalidCredentials);
        }

        self.session_keys.issue(&user.username, &user.email, user.role)
    }

    /// Keys used to sign the tokens returned by [`login`](Self::login).
    pub fn session_keys(&self) -> &SessionKeys {
        &self.session_keys
    }
}

fn require_credentials(username: &str, password: &str) -> crate::Result<()> {
    if username.is_empty() || password.is_empty() {
        Err(Error::Validation { message: "username and password are required".into() })
    } else {
        Ok(())
    }
}

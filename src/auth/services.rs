use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::auth::{
    dto::RegisterRequest,
    error::CredentialError,
    password::PasswordHashing,
    repo::{NewUser, User, UserStore},
};

/// Registration and login against an injected user store.
///
/// Holds no per-user state between calls; every operation reads the store.
#[derive(Clone)]
pub struct CredentialService {
    store: Arc<dyn UserStore>,
    hashing: PasswordHashing,
}

impl CredentialService {
    pub fn new(store: Arc<dyn UserStore>, hashing: PasswordHashing) -> Self {
        Self { store, hashing }
    }

    /// Creates a user. The lookup is only a fast path; the store's unique
    /// constraints decide when two registrations race.
    pub async fn register(&self, req: RegisterRequest) -> Result<User, CredentialError> {
        let RegisterRequest {
            full_name,
            email,
            username,
            password,
        } = req;

        if let Some(existing) = self
            .store
            .find_by_username_or_email(&username, &email)
            .await?
        {
            warn!(%username, existing_id = %existing.id, "username or email already registered");
            return Err(CredentialError::DuplicateAccount);
        }

        let password_hash = self
            .hashing
            .hash(password)
            .await
            .map_err(CredentialError::Hashing)?;

        let user = self
            .store
            .insert(NewUser {
                full_name,
                email,
                username,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Returns the full name of the matching user.
    pub async fn authenticate(
        &self,
        username: &str,
        password: String,
    ) -> Result<String, CredentialError> {
        let user = self
            .store
            .find_by_username(username)
            .await?
            .ok_or(CredentialError::UnknownUser)?;

        let ok = self
            .hashing
            .verify(password, user.password_hash)
            .await
            .map_err(CredentialError::Hashing)?;

        if !ok {
            debug!(user_id = %user.id, "password mismatch");
            return Err(CredentialError::InvalidCredentials);
        }

        info!(user_id = %user.id, %username, "user logged in");
        Ok(user.full_name)
    }
}

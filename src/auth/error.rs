use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::repo::StoreError;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Username or Email already exists.")]
    DuplicateAccount,

    #[error("User not found. Please register first.")]
    UnknownUser,

    #[error("Invalid password. Try again.")]
    InvalidCredentials,

    #[error("{0}")]
    Store(anyhow::Error),

    #[error("{0}")]
    Hashing(anyhow::Error),

    #[error("{0}")]
    BadRequest(String),
}

impl From<StoreError> for CredentialError {
    fn from(e: StoreError) -> Self {
        match e {
            // a concurrent registration got past the advisory check first
            StoreError::UniqueViolation => CredentialError::DuplicateAccount,
            StoreError::Backend(e) => CredentialError::Store(e),
        }
    }
}

impl CredentialError {
    pub fn status(&self) -> StatusCode {
        match self {
            CredentialError::UnknownUser => StatusCode::NOT_FOUND,
            CredentialError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            CredentialError::DuplicateAccount
            | CredentialError::Store(_)
            | CredentialError::Hashing(_)
            | CredentialError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn body(&self) -> String {
        match self {
            CredentialError::DuplicateAccount
            | CredentialError::UnknownUser
            | CredentialError::InvalidCredentials => self.to_string(),
            _ => format!("Error: {self}"),
        }
    }
}

impl IntoResponse for CredentialError {
    fn into_response(self) -> Response {
        match &self {
            CredentialError::Store(e) => error!(error = %e, "user store failure"),
            CredentialError::Hashing(e) => error!(error = %e, "password hashing failure"),
            other => warn!(error = %other, "request rejected"),
        }
        (self.status(), self.body()).into_response()
    }
}

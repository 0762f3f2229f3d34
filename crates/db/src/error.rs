use thiserror::Error;

/// Every way a catalog operation can fail.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidInput(String),

    /// Shared by unknown-user and wrong-password so callers cannot tell them apart.
    #[error("Invalid credentials")]
    Unauthorized,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<bookshop_authz::PasswordError> for StoreError {
    fn from(err: bookshop_authz::PasswordError) -> Self {
        Self::Internal(err.into())
    }
}

impl From<bookshop_authz::TokenError> for StoreError {
    fn from(err: bookshop_authz::TokenError) -> Self {
        Self::Internal(err.into())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

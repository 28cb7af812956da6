//! Persistence contract. Handlers only ever see `dyn Store`; the backing
//! implementation is picked when `AppState` is built.

use async_trait::async_trait;

use crate::models::{PasswordError, User, ValidationErrors};

pub mod sqlstore;
#[cfg(test)]
pub mod teststore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    RecordNotFound,
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("email: already taken.")]
    DuplicateEmail,
    #[error(transparent)]
    Database(sqlx::Error),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Validates, hashes the password and persists `user`, writing the
    /// store-assigned id back into it.
    async fn create(&self, user: &mut User) -> Result<(), StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<User, StoreError>;
    async fn find_by_id(&self, id: i32) -> Result<User, StoreError>;
}

pub trait Store: Send + Sync {
    fn user(&self) -> &dyn UserRepository;
}

/// Runs the entity hooks every repository applies before persisting.
pub(crate) fn prepare_for_create(user: &mut User) -> Result<(), StoreError> {
    user.validate()?;
    user.before_create()?;
    Ok(())
}

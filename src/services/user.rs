use std::sync::Arc;

use crate::models::query::UserFilter;
use crate::models::update::UserPatch;
use crate::models::User;
use crate::storage::{DatabaseProvider, Repository, StorageError};

pub struct UserService {
    repository: Arc<dyn Repository<User>>,
}

impl UserService {
    pub fn new(provider: &Arc<dyn DatabaseProvider>) -> Self {
        Self {
            repository: provider.users(),
        }
    }

    pub async fn create_user(&self, email: &str) -> Result<User, StorageError> {
        if self.user_by_email(email).await?.is_some() {
            return Err(StorageError::Conflict(format!(
                "user with email '{email}' already exists"
            )));
        }
        self.repository.create(User::new(email)).await
    }

    pub async fn user_by_id(&self, id: &str) -> Result<Option<User>, StorageError> {
        self.repository.find_by_id(id).await
    }

    pub async fn all_users(&self) -> Result<Vec<User>, StorageError> {
        self.repository.find_all().await
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let mut matched = self
            .repository
            .find_by(UserFilter {
                email: Some(email.to_string()),
            })
            .await?;
        Ok(matched.pop())
    }

    pub async fn update_user(&self, id: &str, patch: UserPatch) -> Result<User, StorageError> {
        if let Some(email) = &patch.email {
            if let Some(existing) = self.user_by_email(email).await? {
                if existing.id != id {
                    return Err(StorageError::Conflict(format!(
                        "user with email '{email}' already exists"
                    )));
                }
            }
        }
        self.repository.update(id, patch).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), StorageError> {
        self.repository.delete(id).await
    }

    /// Identity-provider integration point: the sign-in flow hands us an
    /// email and gets the matching record, created on first sight.
    pub async fn find_or_create_user(&self, email: &str) -> Result<User, StorageError> {
        if let Some(existing) = self.user_by_email(email).await? {
            return Ok(existing);
        }
        self.create_user(email).await
    }

    pub async fn is_email_available(&self, email: &str) -> Result<bool, StorageError> {
        Ok(self.user_by_email(email).await?.is_none())
    }
}

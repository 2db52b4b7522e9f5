use crate::core::errors::ContentError;
use crate::core::models::user::{User, UserUpdate};
use chrono::{DateTime, Utc};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Inserts a new user; fails with `EmailAlreadyRegistered` if the email is taken.
    async fn create_user(&self, user: User) -> Result<User, ContentError>;
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, ContentError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, ContentError>;
    /// Applies the present fields of `update` under one write lock.
    async fn apply_user_update(
        &self,
        user_id: Uuid,
        update: UserUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<User, ContentError>;
    async fn list_users(&self) -> Result<Vec<User>, ContentError>;
}

pub mod in_memory;

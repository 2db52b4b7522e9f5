use crate::core::errors::ContentError;
use crate::core::models::user::{User, UserUpdate};
use crate::infrastructure::storage::Storage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    users_by_email: Arc<RwLock<HashMap<String, Uuid>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage {
            users: Arc::new(RwLock::new(HashMap::new())),
            users_by_email: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_user(&self, user: User) -> Result<User, ContentError> {
        // email index first; it is the uniqueness guard
        let mut users_by_email = self.users_by_email.write().await;
        if users_by_email.contains_key(&user.email) {
            return Err(ContentError::EmailAlreadyRegistered(user.email));
        }
        let mut users = self.users.write().await;
        users_by_email.insert(user.email.clone(), user.id);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, ContentError> {
        let users = self.users.read().await;
        Ok(users.get(&user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, ContentError> {
        let users_by_email = self.users_by_email.read().await;
        let users = self.users.read().await;
        Ok(users_by_email.get(email).and_then(|id| users.get(id)).cloned())
    }

    async fn apply_user_update(
        &self,
        user_id: Uuid,
        update: UserUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<User, ContentError> {
        let mut users_by_email = self.users_by_email.write().await;
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| ContentError::UserNotFound(user_id.to_string()))?;

        if let Some(email) = update.email.filter(|e| *e != user.email) {
            if users_by_email.contains_key(&email) {
                return Err(ContentError::EmailAlreadyRegistered(email));
            }
            users_by_email.remove(&user.email);
            users_by_email.insert(email.clone(), user_id);
            user.email = email;
        }
        if let Some(name) = update.name {
            user.name = name;
        }
        user.updated_at = updated_at;
        Ok(user.clone())
    }

    async fn list_users(&self) -> Result<Vec<User>, ContentError> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.email.cmp(&b.email)));
        Ok(all)
    }
}


use crate::auth::jwt::{Claims, JwtService};
use crate::core::errors::ContentError;
use crate::core::models::user::{PaginationResult, User, UserQuery, UserRegistration, UserUpdate};
use crate::core::services::{ContentService, UserService};
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, header};
use chrono::Utc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret";

pub fn test_jwt() -> JwtService {
    JwtService::new(TEST_SECRET.to_string(), Duration::from_secs(3600))
}

pub fn create_test_service() -> ContentService<InMemoryStorage> {
    ContentService::new(InMemoryStorage::new(), test_jwt())
}

pub fn sample_user(name: &str, email: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        password: String::new(),
        is_superuser: false,
        created_at: now,
        updated_at: now,
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(body.into()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Service double that records calls. `user` is what every lookup resolves to.
pub struct FakeUserService {
    jwt: JwtService,
    pub user: Option<User>,
    pub fail: bool,
    pub register_calls: AtomicUsize,
    pub get_user_calls: AtomicUsize,
    pub update_calls: Mutex<Vec<(Uuid, UserUpdate)>>,
}

impl FakeUserService {
    pub fn new(user: Option<User>) -> Self {
        FakeUserService {
            jwt: test_jwt(),
            user,
            fail: false,
            register_calls: AtomicUsize::new(0),
            get_user_calls: AtomicUsize::new(0),
            update_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(user: Option<User>) -> Self {
        FakeUserService {
            fail: true,
            ..Self::new(user)
        }
    }

    pub fn token_for(&self, id: Uuid) -> String {
        self.jwt.generate_token(&id.to_string()).unwrap()
    }

    fn storage_failure(&self) -> Result<(), ContentError> {
        if self.fail {
            return Err(ContentError::StorageError("storage offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserService for FakeUserService {
    async fn register_user(&self, data: UserRegistration) -> Result<User, ContentError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        self.storage_failure()?;
        Ok(sample_user(&data.name, &data.email))
    }

    async fn login(&self, email: &str, _password: &str) -> Result<String, ContentError> {
        match &self.user {
            Some(user) if user.email == email => self.jwt.generate_token(&user.id.to_string()),
            _ => Err(ContentError::InvalidCredentials),
        }
    }

    fn validate_token(&self, token: &str) -> Result<Claims, ContentError> {
        self.jwt.validate_token(token)
    }

    async fn get_self(&self, token: &str) -> Result<User, ContentError> {
        self.storage_failure()?;
        self.jwt.validate_token(token)?;
        self.user
            .clone()
            .ok_or_else(|| ContentError::UserNotFound("self".to_string()))
    }

    async fn update_self(&self, user_id: Uuid, data: UserUpdate) -> Result<User, ContentError> {
        self.update_calls.lock().unwrap().push((user_id, data.clone()));
        self.storage_failure()?;
        let mut user = self.user.clone().unwrap_or_default();
        user.id = user_id;
        if let Some(name) = data.name {
            user.name = name;
        }
        if let Some(email) = data.email {
            user.email = email;
        }
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<User, ContentError> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        self.user
            .clone()
            .filter(|u| u.id == user_id)
            .ok_or_else(|| ContentError::UserNotFound(user_id.to_string()))
    }

    async fn list_users(&self, query: UserQuery) -> Result<PaginationResult<User>, ContentError> {
        let items: Vec<User> = self.user.clone().into_iter().collect();
        Ok(PaginationResult {
            total: items.len(),
            items,
            page: query.page.unwrap_or(1),
            page_size: query.page_size.unwrap_or(50),
        })
    }
}

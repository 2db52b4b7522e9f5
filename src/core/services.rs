use crate::auth::jwt::{Claims, JwtService};
use crate::core::errors::ContentError;
use crate::core::models::user::{PaginationResult, User, UserQuery, UserRegistration, UserUpdate};
use crate::infrastructure::storage::Storage;
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use tokio::task::spawn_blocking;
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 100;
const MAX_NAME_LENGTH: usize = 100;

/// Operations the HTTP layer needs from the user domain.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn register_user(&self, data: UserRegistration) -> Result<User, ContentError>;
    /// Returns a signed bearer token for valid credentials.
    async fn login(&self, email: &str, password: &str) -> Result<String, ContentError>;
    fn validate_token(&self, token: &str) -> Result<Claims, ContentError>;
    /// Resolves a bearer token into the user it was issued for.
    async fn get_self(&self, token: &str) -> Result<User, ContentError>;
    async fn update_self(&self, user_id: Uuid, data: UserUpdate) -> Result<User, ContentError>;
    async fn get_user(&self, user_id: Uuid) -> Result<User, ContentError>;
    async fn list_users(&self, query: UserQuery) -> Result<PaginationResult<User>, ContentError>;
}

pub struct ContentService<S: Storage> {
    storage: S,
    jwt_service: JwtService,
}

impl<S: Storage> ContentService<S> {
    pub fn new(storage: S, jwt_service: JwtService) -> Self {
        ContentService { storage, jwt_service }
    }

    fn validate_email(&self, email: &str) -> Result<String, ContentError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(ContentError::MissingEmail);
        }
        if !email.contains('@') || !email.contains('.') || email.len() < 5 {
            return Err(ContentError::InvalidEmail(email));
        }
        Ok(email)
    }

    fn validate_string_input(&self, field: &str, value: &str, max_length: usize) -> Result<(), ContentError> {
        if value.trim().is_empty() {
            return Err(ContentError::invalid_input(
                field,
                format!("Invalid {}", field),
                format!("{} cannot be empty", field),
            ));
        }
        if value.chars().count() > max_length {
            return Err(ContentError::invalid_input(
                field,
                format!("{} Too Long", field),
                format!("{} cannot exceed {} characters", field, max_length),
            ));
        }
        if value.chars().any(|c| c.is_control() || "<>{}[]".contains(c)) {
            return Err(ContentError::invalid_input(
                field,
                format!("Invalid {}", field),
                format!("{} contains invalid characters", field),
            ));
        }
        Ok(())
    }

    fn user_id_from_claims(&self, claims: &Claims) -> Result<Uuid, ContentError> {
        Uuid::parse_str(&claims.sub)
            .map_err(|e| ContentError::Unauthorized(format!("Token subject is not a user id: {}", e)))
    }
}

#[async_trait]
impl<S: Storage> UserService for ContentService<S> {
    async fn register_user(&self, data: UserRegistration) -> Result<User, ContentError> {
        let email = self.validate_email(&data.email)?;
        info!("Registering user with email: {}", email);

        if data.password.is_empty() {
            return Err(ContentError::invalid_input(
                "password",
                "Invalid password",
                "Password cannot be empty",
            ));
        }
        let name = data.name.trim().to_string();
        self.validate_string_input("name", &name, MAX_NAME_LENGTH)?;

        let plain = data.password;
        let password = spawn_blocking(move || bcrypt::hash(plain, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| ContentError::InternalServerError(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| ContentError::InternalServerError(format!("Password hashing error: {}", e)))?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            password,
            is_superuser: false,
            created_at: now,
            updated_at: now,
        };
        let created = self.storage.create_user(user).await?;
        debug!("User {} registered", created.id);
        Ok(created)
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, ContentError> {
        let email = email.trim().to_lowercase();
        let user = self
            .storage
            .get_user_by_email(&email)
            .await?
            .ok_or(ContentError::InvalidCredentials)?;

        let (plain, hash) = (password.to_string(), user.password.clone());
        let verified = spawn_blocking(move || bcrypt::verify(plain, &hash))
            .await
            .map_err(|e| ContentError::InternalServerError(format!("Password verification task failed: {}", e)))?
            .map_err(|e| ContentError::InternalServerError(format!("Password verification error: {}", e)))?;

        if verified {
            self.jwt_service.generate_token(&user.id.to_string())
        } else {
            warn!("Failed login attempt for {}", email);
            Err(ContentError::InvalidCredentials)
        }
    }

    fn validate_token(&self, token: &str) -> Result<Claims, ContentError> {
        self.jwt_service.validate_token(token)
    }

    async fn get_self(&self, token: &str) -> Result<User, ContentError> {
        let claims = self.jwt_service.validate_token(token)?;
        let user_id = self.user_id_from_claims(&claims)?;
        self.get_user(user_id).await
    }

    async fn update_self(&self, user_id: Uuid, data: UserUpdate) -> Result<User, ContentError> {
        info!("Updating user with ID: {}", user_id);

        let name = match data.name {
            Some(name) => {
                let name = name.trim().to_string();
                self.validate_string_input("name", &name, MAX_NAME_LENGTH)?;
                Some(name)
            }
            None => None,
        };
        let email = match data.email {
            Some(email) => Some(self.validate_email(&email)?),
            None => None,
        };

        self.storage
            .apply_user_update(user_id, UserUpdate { name, email }, Utc::now())
            .await
    }

    async fn get_user(&self, user_id: Uuid) -> Result<User, ContentError> {
        self.storage
            .get_user(user_id)
            .await?
            .ok_or_else(|| ContentError::UserNotFound(user_id.to_string()))
    }

    async fn list_users(&self, query: UserQuery) -> Result<PaginationResult<User>, ContentError> {
        let page = query.page.unwrap_or(1);
        let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page == 0 {
            return Err(ContentError::invalid_input("page", "Invalid page", "Page starts at 1"));
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ContentError::invalid_input(
                "page_size",
                "Invalid page size",
                format!("Page size must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }

        let needle = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        let matching: Vec<User> = self
            .storage
            .list_users()
            .await?
            .into_iter()
            .filter(|u| match &needle {
                Some(n) => u.name.to_lowercase().contains(n) || u.email.contains(n),
                None => true,
            })
            .collect();

        let total = matching.len();
        let items = matching
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();
        Ok(PaginationResult {
            items,
            page,
            page_size,
            total,
        })
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// A registered account. `Uuid::nil()` marks "no user".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// bcrypt hash; never leaves the service.
    #[serde(skip_serializing, default)]
    #[schema(ignore)]
    pub password: String,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_nil(&self) -> bool {
        self.id.is_nil()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UserRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Partial profile edit. Fields left out are not touched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    /// Case-insensitive match on name or email.
    #[serde(default)]
    pub q: Option<String>,
    /// 1-based page number.
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

/// Query for single-user lookups; nothing to filter on yet.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UserLookup {}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginationResult<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
}

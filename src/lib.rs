pub mod api;
pub mod auth;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use crate::api::handlers::{SharedUserService, api_routes};
pub use crate::core::errors::ContentError;
pub use crate::core::services::{ContentService, UserService};
pub use crate::infrastructure::storage::in_memory::InMemoryStorage;

#[cfg(test)]
mod tests; // Include integration tests

pub mod adapters;
pub mod context;
pub mod handlers;
pub mod models;
pub mod openapi;

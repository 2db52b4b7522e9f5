use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::errors::ContentError;

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

/// Success envelope: the payload travels under `item`.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct Wrapped<T> {
    pub item: T,
}

pub fn wrap<T>(item: T) -> Wrapped<T> {
    Wrapped { item }
}

/// Encodes `body` as JSON with the given status.
pub fn respond<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, Json(body)).into_response()
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
}

// Newtype wrapper for ContentError to implement IntoResponse
#[derive(Debug)]
pub struct ApiError(pub ContentError);

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ContentError::MissingEmail
            | ContentError::InvalidEmail(_)
            | ContentError::InvalidInput(..)
            | ContentError::MalformedPayload(_)
            | ContentError::InvalidQuery(_)
            | ContentError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ContentError::InvalidCredentials | ContentError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ContentError::UserNotFound(_) => StatusCode::NOT_FOUND,
            ContentError::EmailAlreadyRegistered(_) => StatusCode::CONFLICT,
            ContentError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            ContentError::MissingRequestContext
            | ContentError::InternalServerError(_)
            | ContentError::StorageError(_)
            | ContentError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self.0 {
            ContentError::InvalidInput(_, detail) => format!("{}: {}", detail.title, detail.description),
            // internals stay in the logs
            ContentError::MissingRequestContext
            | ContentError::InternalServerError(_)
            | ContentError::StorageError(_)
            | ContentError::UnexpectedError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        respond(
            status,
            ErrorResponse {
                status: status.as_u16(),
                error: error_message,
            },
        )
    }
}

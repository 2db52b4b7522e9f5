use crate::{
    api::{
        adapters::{query, query_id},
        context::{Actor, AuthToken},
        models::{ApiError, ErrorResponse, LoginRequest, LoginResponse, Wrapped, wrap},
    },
    core::{
        errors::ContentError,
        models::user::{PaginationResult, User, UserLookup, UserQuery, UserRegistration, UserUpdate},
        services::UserService,
    },
};
use axum::{
    Json, Router,
    extract::{Request, State, rejection::JsonRejection},
    http::StatusCode,
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post, put},
};
use http::header;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

pub type SharedUserService = Arc<dyn UserService>;

// Resolves the bearer token into request-scoped AuthToken and Actor values
async fn auth_middleware(
    State(service): State<SharedUserService>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ContentError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ContentError::Unauthorized("Invalid Authorization header".to_string()))?
        .to_string();

    let claims = service.validate_token(&token)?;
    let actor_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ContentError::Unauthorized("Token subject is not a user id".to_string()))?;

    req.extensions_mut().insert(AuthToken(token));
    req.extensions_mut().insert(Actor { id: actor_id });
    Ok(next.run(req).await)
}

// Define API routes
pub fn api_routes(service: SharedUserService) -> Router {
    let list_service = service.clone();
    let lookup_service = service.clone();

    let protected_routes = Router::new()
        .route(
            "/v1/users",
            get(query(
                move |q: UserQuery| list_users(list_service.clone(), q),
                StatusCode::OK,
            )),
        )
        .route("/v1/users/self", get(handle_user_self).put(handle_user_update))
        .route("/v1/users/self/password", put(handle_user_update_password))
        .route(
            "/v1/users/{id}",
            get(query_id(
                "id",
                move |id: Uuid, q: UserLookup| get_user(lookup_service.clone(), id, q),
                StatusCode::OK,
            )),
        )
        .route_layer(middleware::from_fn_with_state(service.clone(), auth_middleware));

    Router::new()
        .route("/v1/users/register", post(handle_user_registration)) // Unprotected
        .route("/v1/users/login", post(handle_user_login)) // Unprotected
        .merge(protected_routes)
        .with_state(service)
}

fn malformed_body(rejection: JsonRejection, details: &'static str) -> ApiError {
    error!(scope = "user", details, error = %rejection, "failed to decode request body");
    ApiError(ContentError::MalformedPayload(rejection.body_text()))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    tag = "User",
    request_body = UserRegistration,
    responses(
        (status = 204, description = "User registered"),
        (status = 400, description = "Malformed or invalid registration data", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub(crate) async fn handle_user_registration(
    State(service): State<SharedUserService>,
    payload: Result<Json<UserRegistration>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(data) = payload.map_err(|e| malformed_body(e, "failed to decode user registration data"))?;

    service.register_user(data).await.map_err(|e| {
        error!(scope = "user", details = "failed to register user", error = %e);
        ApiError(e)
    })?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    tag = "User",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Malformed credentials", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub(crate) async fn handle_user_login(
    State(service): State<SharedUserService>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| malformed_body(e, "failed to decode login data"))?;
    let token = service.login(&req.email, &req.password).await?;
    Ok(Json(LoginResponse { token }))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/self",
    tag = "User",
    responses(
        (status = 200, description = "The current user", body = Wrapped<User>),
        (status = 401, description = "Token does not resolve to a user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn handle_user_self(
    State(service): State<SharedUserService>,
    token: AuthToken,
) -> Result<Json<Wrapped<User>>, ApiError> {
    match service.get_self(token.as_str()).await {
        Ok(user) if !user.is_nil() => Ok(Json(wrap(user))),
        Ok(_) | Err(ContentError::UserNotFound(_)) | Err(ContentError::Unauthorized(_)) => {
            error!(scope = "user", "no user within request context");
            Err(ContentError::Unauthorized("no user within request context".to_string()).into())
        }
        Err(e) => {
            error!(scope = "user", details = "failed to resolve current user", error = %e);
            Err(ContentError::UnexpectedError(e.to_string()).into())
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/users/self",
    tag = "User",
    request_body = UserUpdate,
    responses(
        (status = 200, description = "The updated user", body = Wrapped<User>),
        (status = 400, description = "Malformed or invalid update data", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn handle_user_update(
    State(service): State<SharedUserService>,
    actor: Result<Actor, ApiError>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<Json<Wrapped<User>>, ApiError> {
    // body errors are reported ahead of a missing actor
    let Json(data) = payload.map_err(|e| malformed_body(e, "failed to decode user update data"))?;
    let actor = actor?;

    let updated = service.update_self(actor.id, data).await.map_err(|e| {
        error!(scope = "user", details = "failed to update user", error = %e);
        ApiError(e)
    })?;

    Ok(Json(wrap(updated)))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/self/password",
    tag = "User",
    responses(
        (status = 501, description = "Password change is not available yet", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn handle_user_update_password(_actor: Actor) -> Result<StatusCode, ApiError> {
    Err(ContentError::NotImplemented("Password update".to_string()).into())
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "User",
    params(UserQuery),
    responses(
        (status = 200, description = "Matching users", body = PaginationResult<User>),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn list_users(
    service: SharedUserService,
    query: UserQuery,
) -> Result<PaginationResult<User>, ContentError> {
    service.list_users(query).await
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "User",
    params(
        ("id" = Uuid, Path, description = "ID of the user to retrieve")
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = Wrapped<User>),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn get_user(
    service: SharedUserService,
    id: Uuid,
    _lookup: UserLookup,
) -> Result<Wrapped<User>, ContentError> {
    service.get_user(id).await.map(wrap)
}

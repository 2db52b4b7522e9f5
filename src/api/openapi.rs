use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    api::models::{ErrorResponse, LoginRequest, LoginResponse},
    core::models::user::{User, UserRegistration, UserUpdate},
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::handle_user_registration,
        super::handlers::handle_user_login,
        super::handlers::handle_user_self,
        super::handlers::handle_user_update,
        super::handlers::handle_user_update_password,
        super::handlers::list_users,
        super::handlers::get_user
    ),
    components(schemas(UserRegistration, UserUpdate, LoginRequest, LoginResponse, ErrorResponse, User)),
    modifiers(&BearerAuth),
    tags((name = "User", description = "Registration and self-service profile endpoints")),
    info(
        title = "Content API",
        description = "User endpoints of the content management backend",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;

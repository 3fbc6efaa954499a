//! `OpenAPI` document for the auth surface.

use axum::response::{IntoResponse, Json};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::error::ErrorBody;
use crate::api::handlers::auth::types::{
    ConsumeResetRequest, LoginRequest, LoginResponse, MessageResponse, PermissionsRequest,
    PublicUser, RegisterRequest, ResetRequest,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "taskaro",
        description = "Authentication and session service for the Taskaro API"
    ),
    paths(
        crate::api::handlers::health::health,
        crate::api::handlers::auth::register::register,
        crate::api::handlers::auth::login::login,
        crate::api::handlers::auth::login::logout,
        crate::api::handlers::auth::reset::request_reset,
        crate::api::handlers::auth::reset::consume_reset,
        crate::api::handlers::auth::admin::update_permissions,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        ResetRequest,
        ConsumeResetRequest,
        PermissionsRequest,
        MessageResponse,
        PublicUser,
        ErrorBody,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication and session lifecycle"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// The generated document, for the handler and for offline tooling.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// axum handler serving the document at `/openapi.json`.
pub async fn serve() -> impl IntoResponse {
    Json(openapi())
}

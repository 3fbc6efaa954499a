//! Role/whitelist administration endpoint.

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error::ErrorBody;
use crate::api::handlers::auth::principal::require_auth;
use crate::api::handlers::auth::types::{MessageResponse, PermissionsRequest};
use crate::auth::{AuthError, AuthService};

#[utoipa::path(
    patch,
    path = "/auth/permissions/{user_id}",
    request_body = PermissionsRequest,
    params(
        ("user_id" = Uuid, Path, description = "Target user id")
    ),
    responses(
        (status = 200, description = "Permissions updated; target sessions revoked", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Actor is not an admin", body = ErrorBody),
        (status = 404, description = "Target user not found", body = ErrorBody)
    ),
    security(("bearer_token" = [])),
    tag = "auth"
)]
pub async fn update_permissions(
    headers: HeaderMap,
    service: Extension<Arc<AuthService>>,
    Path(user_id): Path<Uuid>,
    payload: Option<Json<PermissionsRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    // Authenticate before reading the body so dead tokens always see 401
    let claims = require_auth(&headers, &service).await?;

    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    service
        .update_permissions(&claims, user_id, request.role, request.whitelisted)
        .await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Permissions updated successfully")),
    ))
}

//! Login and logout endpoints.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::error::ErrorBody;
use crate::api::handlers::auth::principal::extract_bearer_token;
use crate::api::handlers::auth::types::{LoginRequest, LoginResponse, MessageResponse, PublicUser};
use crate::auth::{AuthError, AuthService};

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn login(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    let (token, user) = service.login(&request.email, &request.password).await?;

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            token,
            user: PublicUser::from(&user),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session revoked; idempotent", body = MessageResponse)
    ),
    security(("bearer_token" = [])),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    service: Extension<Arc<AuthService>>,
) -> impl IntoResponse {
    // Idempotent: a missing or already-dead token still gets a 200
    if let Some(token) = extract_bearer_token(&headers) {
        service.logout(&token).await;
    }

    (
        StatusCode::OK,
        Json(MessageResponse::new("Logged out successfully")),
    )
}

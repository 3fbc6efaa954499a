//! Password-reset endpoints.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::error::ErrorBody;
use crate::api::handlers::auth::types::{ConsumeResetRequest, MessageResponse, ResetRequest};
use crate::auth::{AuthError, AuthService};

/// The one answer reset requests ever get, whether or not the email exists.
const GENERIC_RESET_MESSAGE: &str = "If the email exists, a reset link will be sent";

#[utoipa::path(
    post,
    path = "/auth/reset-password",
    request_body = ResetRequest,
    responses(
        (status = 200, description = "Generic acknowledgement; never reveals account existence", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn request_reset(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<ResetRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    service.request_password_reset(&request.email).await;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new(GENERIC_RESET_MESSAGE)),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/reset-password/{ticket}",
    request_body = ConsumeResetRequest,
    params(
        ("ticket" = String, Path, description = "Single-use reset ticket id")
    ),
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Ticket invalid or expired", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn consume_reset(
    service: Extension<Arc<AuthService>>,
    Path(ticket): Path<String>,
    payload: Option<Json<ConsumeResetRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    service
        .consume_password_reset(&ticket, &request.new_password)
        .await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Password updated successfully")),
    ))
}

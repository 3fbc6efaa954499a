//! HTTP mapping for the domain error taxonomy.
//!
//! Every error response carries a stable machine-readable `code` and a human
//! message. Dependency failures are logged here with their full chain and
//! reach the client only as a generic 502; internals never leak.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::auth::AuthError;

/// Wire shape of every error response.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub error: String,
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::AlreadyExists | Self::TicketInvalidOrExpired => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidCredentials | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Dependency(_) => StatusCode::BAD_GATEWAY,
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::AlreadyExists => "already_exists",
            Self::InvalidCredentials => "invalid_credentials",
            Self::InvalidToken => "invalid_token",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::TicketInvalidOrExpired => "invalid_or_expired",
            Self::Dependency(_) => "dependency_error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let Self::Dependency(ref source) = self {
            // Full chain goes to the operator, a generic message to the client
            error!("Dependency failure: {source:#}");
        }

        let body = ErrorBody {
            code: self.code().to_string(),
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn taxonomy_maps_to_expected_statuses() {
        assert_eq!(
            AuthError::Validation("bad".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::AlreadyExists.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::TicketInvalidOrExpired.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::Dependency(anyhow!("down")).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(AuthError::AlreadyExists.code(), "already_exists");
        assert_eq!(AuthError::InvalidCredentials.code(), "invalid_credentials");
        assert_eq!(AuthError::TicketInvalidOrExpired.code(), "invalid_or_expired");
        assert_eq!(AuthError::Dependency(anyhow!("down")).code(), "dependency_error");
    }

    #[test]
    fn dependency_message_does_not_leak_internals() {
        let err = AuthError::Dependency(anyhow!("connection refused to 10.0.0.5:5432"));
        assert_eq!(err.to_string(), "Upstream dependency failed");
    }
}

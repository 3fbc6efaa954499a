//! Bearer-token extraction and authenticated principal resolution.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::auth::{AuthError, AuthService};
use crate::token::Claims;

/// Resolve the bearer token into verified claims, or fail closed.
///
/// # Errors
/// `InvalidToken` for a missing header, a malformed header, or any token
/// failing the dual-store check.
pub async fn require_auth(headers: &HeaderMap, service: &AuthService) -> Result<Claims, AuthError> {
    let token = extract_bearer_token(headers).ok_or(AuthError::InvalidToken)?;
    service
        .tokens()
        .verify(&token)
        .await
        .map_err(|_| AuthError::InvalidToken)
}

/// Pull the token out of `Authorization: Bearer <token>`, tolerating case
/// on the scheme and surrounding whitespace.
#[must_use]
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers), Some("abc.def".to_string()));
    }

    #[test]
    fn tolerates_lowercase_scheme_and_whitespace() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("  bearer  abc  "));
        assert_eq!(extract_bearer_token(&headers), Some("abc".to_string()));
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer_token(&headers), None);
    }
}

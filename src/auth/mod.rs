pub mod jwt;
pub mod password;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::handlers::ApiError;

/// Authenticated caller, extracted from a `Bearer` token. Handlers that
/// take this as an argument reject unauthenticated requests with 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

        let claims = jwt::verify_token(token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;
        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| ApiError::Unauthorized("Invalid token subject".to_string()))?;

        Ok(AuthUser {
            user_id,
            username: claims.username,
        })
    }
}

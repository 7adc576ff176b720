use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::jwt::{JwtKeys, TokenError};
use crate::error::ErrorBody;

/// Extracts and validates the bearer token, resolving the caller's user id.
#[derive(Debug)]
pub struct AuthUser(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    MissingHeader,
    MalformedHeader,
    MissingToken,
    InvalidOrExpiredToken,
}

impl AuthRejection {
    fn message(self) -> &'static str {
        match self {
            Self::MissingHeader => "Authentication token is required",
            Self::MalformedHeader => "Token should be in format: Bearer <token>",
            Self::MissingToken => "Authentication token is required",
            Self::InvalidOrExpiredToken => "Token is invalid or expired",
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody::new("Unauthenticated", self.message())),
        )
            .into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthRejection::MissingHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthRejection::MalformedHeader)?;
        if token.is_empty() {
            return Err(AuthRejection::MissingToken);
        }

        match keys.verify(token) {
            Ok(claims) => Ok(AuthUser(claims.sub)),
            Err(TokenError::Expired) => {
                warn!("expired token");
                Err(AuthRejection::InvalidOrExpiredToken)
            }
            Err(TokenError::Invalid) => {
                warn!("invalid token");
                Err(AuthRejection::InvalidOrExpiredToken)
            }
        }
    }
}

//! Authentication Middleware
//! Mission: Protect routes with the session token

use crate::api::ApiError;
use crate::auth::{cookie, jwt::JwtHandler, models::UserId};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Identity of a request that passed [`auth_middleware`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

/// Validates the session token and stores the caller's id in the request
/// extensions. Any failure is a 401 with no partial identity.
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = cookie::token_from_request(&jar, req.headers()).ok_or(ApiError::Unauthenticated)?;

    let user_id = jwt_handler.verify_now(&token)?;
    req.extensions_mut().insert(CurrentUser(user_id));

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .ok_or(ApiError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request as HttpRequest};

    #[tokio::test]
    async fn test_current_user_requires_middleware() {
        let req = HttpRequest::new(Body::empty());
        let (mut parts, _) = req.into_parts();

        let missing = CurrentUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(missing, Err(ApiError::Unauthenticated)));

        let id = UserId::new();
        parts.extensions.insert(CurrentUser(id));
        let found = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found, CurrentUser(id));
    }
}

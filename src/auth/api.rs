//! Authentication API Endpoints
//! Mission: Registration, login, logout and the caller's profile

use crate::api::{ApiError, CreatedResponse};
use crate::app::AppState;
use crate::auth::{
    cookie,
    middleware::CurrentUser,
    models::{LoginForm, LoginResponse, NewUser, UserId, UserResponse},
};
use axum::{extract::State, http::StatusCode, Form, Json};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use serde_json::{json, Value};
use tracing::{info, warn};

/// Register - POST /api/users
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Form(form), _): WithRejection<Form<NewUser>, ApiError>,
) -> Result<(StatusCode, Json<CreatedResponse<UserId>>), ApiError> {
    let id = state.users.create(form).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Login - POST /api/auth/login
///
/// Unknown login id and wrong password get the same answer.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Form(form), _): WithRejection<Form<LoginForm>, ApiError>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    info!("🔐 Login attempt: {}", form.login_id);

    let Some(user) = state.users.authenticate(&form.login_id, &form.password).await? else {
        warn!("❌ Failed login attempt: {}", form.login_id);
        return Err(ApiError::InvalidCredentials);
    };

    let token = state.jwt.issue_now(&user)?;
    info!("✅ Login successful: {} ({})", user.login_id, user.id);

    let jar = cookie::attach(jar, &token, state.cookies);
    Ok((
        jar,
        Json(LoginResponse {
            expires_in: state.jwt.ttl_secs(),
            user: UserResponse::from_user(&user),
        }),
    ))
}

/// Logout - POST /api/auth/logout
///
/// Succeeds whether or not the caller was logged in.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    (
        cookie::clear(jar, state.cookies),
        Json(json!({ "message": "logged out" })),
    )
}

/// Current user - GET /api/users/me
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<UserResponse>, ApiError> {
    // A valid token for a user that no longer exists is still unauthenticated
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    Ok(Json(UserResponse::from_user(&user)))
}

//! Authentication Models
//! Mission: Define user, token and login data structures

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Server-assigned user identity carried in tokens and ticket owner fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// User account document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub login_id: String,
    pub full_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub email: Option<String>,
    pub birth_date: Option<String>,
    pub sex: Option<String>,
    pub created_at: String,
}

/// Registration form. Name and password are accepted as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub login_id: String,
    pub full_name: String,
    pub password: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub birth_date: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sex: Option<String>,
}

impl NewUser {
    pub fn new(
        login_id: impl Into<String>,
        full_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            login_id: login_id.into(),
            full_name: full_name.into(),
            password: password.into(),
            email: None,
            birth_date: None,
            sex: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// HTML forms submit untouched optional inputs as empty strings.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (user id)
    pub login_id: String,
    pub iat: i64,
    pub exp: i64,
}

/// Login form body
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub login_id: String,
    pub password: String,
}

/// Login response; the token itself only travels in the cookie
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub expires_in: i64,
    pub user: UserResponse,
}

/// User response (sanitized)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub login_id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub birth_date: Option<String>,
    pub sex: Option<String>,
    pub created_at: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            login_id: user.login_id.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            birth_date: user.birth_date.clone(),
            sex: user.sex.clone(),
            created_at: user.created_at.clone(),
        }
    }
}

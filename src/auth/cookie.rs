//! Session Cookie
//! Mission: Carry the session token to and from the browser
//!
//! This is the only place a token crosses to the client. The cookie is
//! HttpOnly, so page scripts cannot read it; there is no CSRF protection.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const COOKIE_NAME: &str = "access_token";

/// Cookie attributes taken from configuration
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    pub secure: bool,
    pub max_age_secs: i64,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: true,
            max_age_secs: crate::auth::jwt::DEFAULT_TOKEN_TTL_SECS,
        }
    }
}

fn base_cookie(value: String, settings: CookieSettings, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, value))
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Set the session cookie for a freshly issued token.
pub fn attach(jar: CookieJar, token: &str, settings: CookieSettings) -> CookieJar {
    jar.add(base_cookie(
        token.to_string(),
        settings,
        settings.max_age_secs,
    ))
}

/// Overwrite the session cookie with an already-expired empty value.
pub fn clear(jar: CookieJar, settings: CookieSettings) -> CookieJar {
    jar.add(base_cookie(String::new(), settings, 0))
}

/// Token presented by the client: the session cookie first, then an
/// `Authorization: Bearer` header for script and API clients.
pub fn token_from_request(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    let from_cookie = jar
        .get(COOKIE_NAME)
        .map(|c| strip_bearer(c.value()).to_string())
        .filter(|t| !t.is_empty());

    from_cookie.or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    })
}

// Older clients stored "Bearer <token>" in the cookie value
fn strip_bearer(value: &str) -> &str {
    value.strip_prefix("Bearer ").unwrap_or(value).trim()
}

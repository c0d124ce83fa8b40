//! Configuration
//!
//! Command-line flags with environment fallbacks. `.env` files are loaded
//! before parsing, so every flag can also live there.

use crate::auth::jwt::MAX_TOKEN_TTL_SECS;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::Path;
use tracing::warn;

const DEV_JWT_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";

/// Who may call `GET /api/tickets`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListPolicy {
    Public,
    Authenticated,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "myjet")]
#[command(about = "My Jet booking backend - cookie-authenticated ticket API")]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "MYJET_BIND_ADDR", default_value = "0.0.0.0:3000")]
    pub bind_addr: String,

    /// SQLite file holding the user and ticket collections (":memory:" for none)
    #[arg(long, env = "MYJET_DB_PATH", default_value = "myjet.db")]
    pub db_path: String,

    /// HS256 signing secret, fixed for the life of the process
    #[arg(long, env = "JWT_SECRET", default_value = DEV_JWT_SECRET, hide_env_values = true, hide_default_value = true)]
    pub jwt_secret: String,

    /// Session lifetime in seconds (token expiry and cookie Max-Age)
    #[arg(long, env = "TOKEN_TTL_SECS", default_value_t = crate::auth::jwt::DEFAULT_TOKEN_TTL_SECS)]
    pub token_ttl_secs: i64,

    /// Mark the session cookie Secure (HTTPS only)
    #[arg(long, env = "COOKIE_SECURE", default_value_t = true, action = ArgAction::Set)]
    pub cookie_secure: bool,

    /// Access policy for listing every ticket
    #[arg(long, env = "LIST_POLICY", value_enum, default_value_t = ListPolicy::Authenticated)]
    pub list_policy: ListPolicy,

    /// bcrypt work factor
    #[arg(long, env = "BCRYPT_COST", default_value_t = crate::auth::password::DEFAULT_COST)]
    pub bcrypt_cost: u32,

    /// Minimum password length at registration (0 accepts anything)
    #[arg(long, env = "PASSWORD_MIN_LEN", default_value_t = 0)]
    pub password_min_len: usize,

    /// Login/registration requests per client IP per minute
    #[arg(long, env = "LOGIN_RATE_LIMIT", default_value_t = 20)]
    pub login_rate_limit: u32,

    /// Extra requests tolerated above the limit
    #[arg(long, env = "LOGIN_RATE_BURST", default_value_t = 5)]
    pub login_rate_burst: u32,

    /// Tickets fetched per page while streaming the full list
    #[arg(long, env = "TICKET_PAGE_SIZE", default_value_t = crate::tickets::store::DEFAULT_PAGE_SIZE)]
    pub ticket_page_size: usize,
}

impl Config {
    /// Reject settings the server cannot run with and warn about weak ones.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }
        if self.token_ttl_secs <= 0 {
            anyhow::bail!("TOKEN_TTL_SECS must be positive");
        }
        if self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            anyhow::bail!("TOKEN_TTL_SECS must be at most {}", MAX_TOKEN_TTL_SECS);
        }
        if self.jwt_secret == DEV_JWT_SECRET {
            warn!("⚠️  Using the development JWT secret. SET JWT_SECRET IN PRODUCTION!");
        } else if self.jwt_secret.len() < 32 {
            warn!("JWT secret is shorter than recommended (32 bytes)");
        }
        if !self.cookie_secure {
            warn!("Session cookie is not marked Secure");
        }
        Ok(())
    }
}

/// Load `.env` from the working directory (and parents), then the crate dir.
pub fn load_env() {
    let _ = dotenv::dotenv();

    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

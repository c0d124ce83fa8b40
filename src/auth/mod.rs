//! Authentication Module
//! Mission: Password login, signed session tokens and the cookie that carries them

pub mod api;
pub mod cookie;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod user_store;

pub use jwt::{JwtHandler, TokenError};
pub use middleware::{auth_middleware, CurrentUser};
pub use user_store::{StoreError, UserStore};

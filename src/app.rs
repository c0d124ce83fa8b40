//! Application wiring: shared state and the route table

use crate::auth::{
    api as auth_api,
    cookie::CookieSettings,
    jwt::JwtHandler,
    middleware::auth_middleware,
    user_store::{PasswordPolicy, UserStore},
};
use crate::config::{Config, ListPolicy};
use crate::db::Database;
use crate::middleware::{rate_limit_middleware, request_logging, RateLimitConfig, RateLimitLayer};
use crate::tickets::{api as tickets_api, store::TicketStore};
use anyhow::Result;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::{sync::Arc, time::Duration};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// State shared by every handler. Everything in here is read-only or an
/// opaque store handle.
#[derive(Clone)]
pub struct AppState {
    pub users: UserStore,
    pub tickets: TicketStore,
    pub jwt: Arc<JwtHandler>,
    pub cookies: CookieSettings,
    pub list_policy: ListPolicy,
    pub login_limiter: RateLimitLayer,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let db = Database::open(&config.db_path)?;
        info!("📊 Document database opened at: {}", config.db_path);
        Self::with_database(db, config)
    }

    pub fn with_database(db: Database, config: &Config) -> Result<Self> {
        let users = UserStore::new(db.clone(), config.bcrypt_cost)?.with_policy(PasswordPolicy {
            min_len: config.password_min_len,
        });
        let tickets = TicketStore::new(db).with_page_size(config.ticket_page_size);

        Ok(Self {
            users,
            tickets,
            jwt: Arc::new(JwtHandler::new(&config.jwt_secret, config.token_ttl_secs)),
            cookies: CookieSettings {
                secure: config.cookie_secure,
                max_age_secs: config.token_ttl_secs,
            },
            list_policy: config.list_policy,
            login_limiter: RateLimitLayer::new(RateLimitConfig {
                max_requests: config.login_rate_limit,
                window: Duration::from_secs(60),
                burst: config.login_rate_burst,
            }),
        })
    }
}

/// Build the full router.
pub fn build_router(state: AppState) -> Router {
    // Credential endpoints, throttled per client IP
    let auth_routes = Router::new()
        .route("/api/users", post(auth_api::register))
        .route("/api/auth/login", post(auth_api::login))
        .route_layer(middleware::from_fn_with_state(
            state.login_limiter.clone(),
            rate_limit_middleware,
        ))
        .route("/api/auth/logout", post(auth_api::logout));

    let mut protected_routes = Router::new()
        .route("/api/users/me", get(auth_api::me))
        .route("/api/tickets", post(tickets_api::create_ticket))
        .route("/api/tickets/mine", get(tickets_api::my_tickets))
        .route("/api/tickets/:id", delete(tickets_api::delete_ticket))
        .route("/api/tickets/cancel", post(tickets_api::cancel_by_date))
        .route("/api/tickets/cancel-all", post(tickets_api::cancel_all));

    let mut public_routes = Router::new().route("/health", get(health_check));

    match state.list_policy {
        ListPolicy::Public => {
            public_routes = public_routes.route("/api/tickets", get(tickets_api::list_tickets));
        }
        ListPolicy::Authenticated => {
            protected_routes =
                protected_routes.route("/api/tickets", get(tickets_api::list_tickets));
        }
    }

    let protected_routes = protected_routes.route_layer(middleware::from_fn_with_state(
        state.jwt.clone(),
        auth_middleware,
    ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(auth_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "✈️  My Jet Operational"
}

//! User Storage
//! Mission: Persist user documents with unique login ids

use crate::auth::models::{NewUser, User, UserId};
use crate::auth::password;
use crate::db::Database;
use chrono::Utc;
use rusqlite::{params, ErrorCode, OptionalExtension, Row};
use thiserror::Error;
use tracing::{info, warn};

/// Credential store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("login id already registered")]
    DuplicateIdentifier,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("password shorter than {min_len} characters")]
    WeakPassword { min_len: usize },
    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.into())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Database(e.into())
    }
}

/// Opt-in password rule. Off by default: passwords are accepted as-is
/// unless an operator sets a minimum length.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordPolicy {
    pub min_len: usize,
}

impl PasswordPolicy {
    fn check(&self, password: &str) -> Result<(), StoreError> {
        if password.chars().count() < self.min_len {
            return Err(StoreError::WeakPassword {
                min_len: self.min_len,
            });
        }
        Ok(())
    }
}

/// User storage over the document database
#[derive(Clone)]
pub struct UserStore {
    db: Database,
    bcrypt_cost: u32,
    policy: PasswordPolicy,
    // Verified against when the login id is unknown, so both failure paths
    // pay for one bcrypt check
    dummy_hash: String,
}

impl UserStore {
    pub fn new(db: Database, bcrypt_cost: u32) -> anyhow::Result<Self> {
        let dummy_hash = password::hash("myjet-dummy-password", bcrypt_cost)?;
        Ok(Self {
            db,
            bcrypt_cost,
            policy: PasswordPolicy::default(),
            dummy_hash,
        })
    }

    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register a user. The login id (and email, when given) must be unused.
    pub async fn create(&self, new_user: NewUser) -> Result<UserId, StoreError> {
        self.policy.check(&new_user.password)?;

        let password_hash =
            password::hash_blocking(new_user.password.clone(), self.bcrypt_cost).await?;

        let user = User {
            id: UserId::new(),
            login_id: new_user.login_id,
            full_name: new_user.full_name,
            password_hash,
            email: new_user.email,
            birth_date: new_user.birth_date,
            sex: new_user.sex,
            created_at: Utc::now().to_rfc3339(),
        };
        let doc = serde_json::to_string(&user)?;

        let conn = self.db.lock().await;
        let inserted = conn.execute(
            "INSERT INTO users (id, login_id, email, password_hash, doc)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.login_id,
                user.email,
                user.password_hash,
                doc,
            ],
        );

        match inserted {
            Ok(_) => {
                info!("✅ Created user: {} ({})", user.login_id, user.id);
                Ok(user.id)
            }
            Err(rusqlite::Error::SqliteFailure(err, Some(msg)))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                warn!("Registration rejected for {}: {}", user.login_id, msg);
                if msg.contains("users.email") {
                    Err(StoreError::DuplicateEmail)
                } else {
                    Err(StoreError::DuplicateIdentifier)
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get user by login id
    pub async fn find_by_identifier(&self, login_id: &str) -> Result<Option<User>, StoreError> {
        let conn = self.db.lock().await;
        let row = conn
            .query_row(
                "SELECT doc, password_hash FROM users WHERE login_id = ?1",
                params![login_id],
                read_user_row,
            )
            .optional()?;
        row.map(into_user).transpose()
    }

    /// Get user by server-assigned id
    pub async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>, StoreError> {
        let conn = self.db.lock().await;
        let row = conn
            .query_row(
                "SELECT doc, password_hash FROM users WHERE id = ?1",
                params![user_id.to_string()],
                read_user_row,
            )
            .optional()?;
        row.map(into_user).transpose()
    }

    /// Check credentials. Unknown login id and wrong password both give `None`.
    pub async fn authenticate(
        &self,
        login_id: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = self.find_by_identifier(login_id).await?;
        let digest = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());

        let valid = password::verify_blocking(password.to_string(), digest).await?;
        Ok(user.filter(|_| valid))
    }
}

fn read_user_row(row: &Row<'_>) -> rusqlite::Result<(String, String)> {
    Ok((row.get(0)?, row.get(1)?))
}

fn into_user((doc, password_hash): (String, String)) -> Result<User, StoreError> {
    let mut user: User = serde_json::from_str(&doc)?;
    user.password_hash = password_hash;
    Ok(user)
}

//! Document Database
//! Mission: Keep user and ticket documents in one SQLite file
//!
//! Each collection is a table holding the JSON document plus the few key
//! columns that need uniqueness or lookup (login id, email, owner, date).

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Shared handle to the document database.
///
/// Every store operation takes the lock once, so a single call is atomic with
/// respect to every other call on the same handle.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file and ensure the collections exist.
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).context("open document db")?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();
        Self::from_connection(conn)
    }

    /// In-memory database, used by tests and throwaway runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory document db")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    // Users collection
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            login_id TEXT UNIQUE NOT NULL,
            email TEXT UNIQUE,
            password_hash TEXT NOT NULL,
            doc TEXT NOT NULL
        )",
        [],
    )
    .context("create users collection")?;

    // Tickets collection; seq gives a stable insertion order for paging
    conn.execute(
        "CREATE TABLE IF NOT EXISTS tickets (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT UNIQUE NOT NULL,
            owner_id TEXT NOT NULL,
            departure_date TEXT NOT NULL,
            doc TEXT NOT NULL
        )",
        [],
    )
    .context("create tickets collection")?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tickets_owner_date ON tickets(owner_id, departure_date)",
        [],
    )?;

    debug!("document collections ready");
    Ok(())
}

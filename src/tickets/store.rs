//! Ticket Storage
//! Mission: Persist ticket documents and enforce ownership on removal

use crate::auth::models::UserId;
use crate::db::Database;
use crate::tickets::models::{NewTicket, Ticket, TicketId};
use chrono::Utc;
use futures_util::{stream, Stream, TryStreamExt};
use rusqlite::{params, OptionalExtension};
use thiserror::Error;
use tracing::{debug, info};

/// Tickets fetched per round-trip while streaming `list()`.
pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum TicketStoreError {
    #[error("ticket not found")]
    NotFound,
    #[error("ticket belongs to another user")]
    Unauthorized,
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for TicketStoreError {
    fn from(e: rusqlite::Error) -> Self {
        TicketStoreError::Database(e.into())
    }
}

impl From<serde_json::Error> for TicketStoreError {
    fn from(e: serde_json::Error) -> Self {
        TicketStoreError::Database(e.into())
    }
}

#[derive(Clone)]
pub struct TicketStore {
    db: Database,
    page_size: usize,
}

impl TicketStore {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Book a ticket for `owner_id`.
    ///
    /// Start and end must differ, and an owner holds at most one ticket per
    /// departure date.
    pub async fn create(
        &self,
        owner_id: UserId,
        fields: NewTicket,
    ) -> Result<TicketId, TicketStoreError> {
        if fields.starting_point.trim() == fields.ending_point.trim() {
            return Err(TicketStoreError::Conflict(
                "starting and ending points must differ".to_string(),
            ));
        }

        let ticket = Ticket {
            id: TicketId::new(),
            owner_id,
            starting_point: fields.starting_point,
            ending_point: fields.ending_point,
            departure_date: fields.departure_date,
            jet_type: fields.jet_type,
            created_at: Utc::now().to_rfc3339(),
        };
        let doc = serde_json::to_string(&ticket)?;

        let conn = self.db.lock().await;
        let same_day: i64 = conn.query_row(
            "SELECT COUNT(*) FROM tickets WHERE owner_id = ?1 AND departure_date = ?2",
            params![owner_id.to_string(), ticket.departure_date],
            |row| row.get(0),
        )?;
        if same_day > 0 {
            return Err(TicketStoreError::Conflict(format!(
                "already booked a flight on {}",
                ticket.departure_date
            )));
        }

        conn.execute(
            "INSERT INTO tickets (id, owner_id, departure_date, doc) VALUES (?1, ?2, ?3, ?4)",
            params![
                ticket.id.to_string(),
                owner_id.to_string(),
                ticket.departure_date,
                doc,
            ],
        )?;

        info!(
            "✈️  Ticket {} booked by {} ({} -> {} on {})",
            ticket.id,
            owner_id,
            ticket.starting_point,
            ticket.ending_point,
            ticket.departure_date
        );
        Ok(ticket.id)
    }

    /// Every ticket in booking order, fetched lazily one page at a time.
    ///
    /// The stream ends after the last page; call `list()` again to restart.
    pub fn list(&self) -> impl Stream<Item = Result<Ticket, TicketStoreError>> + Send + 'static {
        let db = self.db.clone();
        let page_size = self.page_size;

        stream::try_unfold(Some(0i64), move |cursor| {
            let db = db.clone();
            async move {
                let Some(after_seq) = cursor else {
                    return Ok(None);
                };
                let page = fetch_page(&db, after_seq, page_size).await?;
                let Some(&(last_seq, _)) = page.last() else {
                    return Ok(None);
                };
                let next = (page.len() == page_size).then_some(last_seq);
                debug!("ticket page after seq {}: {} rows", after_seq, page.len());

                let tickets = page
                    .into_iter()
                    .map(|(_, ticket)| Ok::<_, TicketStoreError>(ticket));
                Ok::<_, TicketStoreError>(Some((stream::iter(tickets), next)))
            }
        })
        .try_flatten()
    }

    /// Tickets owned by one user, in booking order.
    pub async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Ticket>, TicketStoreError> {
        let conn = self.db.lock().await;
        let mut stmt =
            conn.prepare_cached("SELECT doc FROM tickets WHERE owner_id = ?1 ORDER BY seq ASC")?;
        let docs = stmt
            .query_map(params![owner_id.to_string()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        docs.iter()
            .map(|doc| serde_json::from_str(doc).map_err(TicketStoreError::from))
            .collect()
    }

    /// Remove a ticket on behalf of `requester`, who must own it.
    pub async fn delete_by_id(
        &self,
        ticket_id: TicketId,
        requester: UserId,
    ) -> Result<(), TicketStoreError> {
        let conn = self.db.lock().await;
        let owner: Option<String> = conn
            .query_row(
                "SELECT owner_id FROM tickets WHERE id = ?1",
                params![ticket_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match owner {
            None => Err(TicketStoreError::NotFound),
            Some(owner) if owner != requester.to_string() => Err(TicketStoreError::Unauthorized),
            Some(_) => {
                conn.execute(
                    "DELETE FROM tickets WHERE id = ?1",
                    params![ticket_id.to_string()],
                )?;
                info!("🗑️  Ticket {} cancelled by {}", ticket_id, requester);
                Ok(())
            }
        }
    }

    /// Cancel the owner's ticket for one departure date.
    pub async fn cancel_by_departure_date(
        &self,
        owner_id: UserId,
        departure_date: &str,
    ) -> Result<(), TicketStoreError> {
        let conn = self.db.lock().await;
        let removed = conn.execute(
            "DELETE FROM tickets WHERE owner_id = ?1 AND departure_date = ?2",
            params![owner_id.to_string(), departure_date],
        )?;

        if removed == 0 {
            return Err(TicketStoreError::NotFound);
        }
        info!("🗑️  {} cancelled flight on {}", owner_id, departure_date);
        Ok(())
    }

    /// Cancel every ticket the owner holds; returns how many were removed.
    pub async fn cancel_all(&self, owner_id: UserId) -> Result<u64, TicketStoreError> {
        let conn = self.db.lock().await;
        let removed = conn.execute(
            "DELETE FROM tickets WHERE owner_id = ?1",
            params![owner_id.to_string()],
        )?;

        info!("🗑️  {} cancelled all {} tickets", owner_id, removed);
        Ok(removed as u64)
    }
}

async fn fetch_page(
    db: &Database,
    after_seq: i64,
    page_size: usize,
) -> Result<Vec<(i64, Ticket)>, TicketStoreError> {
    let conn = db.lock().await;
    let mut stmt = conn.prepare_cached(
        "SELECT seq, doc FROM tickets WHERE seq > ?1 ORDER BY seq ASC LIMIT ?2",
    )?;
    let rows = stmt
        .query_map(params![after_seq, page_size as i64], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(seq, doc)| Ok((seq, serde_json::from_str(&doc)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (TicketStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db = Database::open(temp_file.path().to_str().unwrap()).unwrap();
        (TicketStore::new(db), temp_file)
    }

    fn flight(from: &str, to: &str, date: &str) -> NewTicket {
        NewTicket {
            starting_point: from.to_string(),
            ending_point: to.to_string(),
            departure_date: date.to_string(),
            jet_type: "Gulfstream G650".to_string(),
        }
    }

    async fn collect(store: &TicketStore) -> Vec<Ticket> {
        store.list().try_collect().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (store, _temp) = create_test_store();
        let owner = UserId::new();

        let id = store
            .create(owner, flight("SFO", "JFK", "2025-06-01"))
            .await
            .unwrap();

        let all = collect(&store).await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert_eq!(all[0].owner_id, owner);
        assert_eq!(all[0].starting_point, "SFO");
    }

    #[tokio::test]
    async fn test_same_start_and_end_rejected() {
        let (store, _temp) = create_test_store();
        let result = store
            .create(UserId::new(), flight("SFO", "SFO", "2025-06-01"))
            .await;
        assert!(matches!(result, Err(TicketStoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_one_flight_per_owner_per_day() {
        let (store, _temp) = create_test_store();
        let alice = UserId::new();
        let bob = UserId::new();

        store
            .create(alice, flight("SFO", "JFK", "2025-06-01"))
            .await
            .unwrap();
        let again = store
            .create(alice, flight("LAX", "ORD", "2025-06-01"))
            .await;
        assert!(matches!(again, Err(TicketStoreError::Conflict(_))));

        // Another owner may fly the same day
        store
            .create(bob, flight("LAX", "ORD", "2025-06-01"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let (store, _temp) = create_test_store();
        let alice = UserId::new();
        let bob = UserId::new();

        let id = store
            .create(alice, flight("SFO", "JFK", "2025-06-01"))
            .await
            .unwrap();

        let by_bob = store.delete_by_id(id, bob).await;
        assert!(matches!(by_bob, Err(TicketStoreError::Unauthorized)));
        assert_eq!(collect(&store).await.len(), 1);

        store.delete_by_id(id, alice).await.unwrap();
        assert!(collect(&store).await.iter().all(|t| t.id != id));

        let again = store.delete_by_id(id, alice).await;
        assert!(matches!(again, Err(TicketStoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_pages_and_restarts() {
        let (store, _temp) = create_test_store();
        let store = store.with_page_size(2);
        let owner = UserId::new();

        for day in 1..=5 {
            store
                .create(owner, flight("SFO", "JFK", &format!("2025-06-0{}", day)))
                .await
                .unwrap();
        }

        let first = collect(&store).await;
        assert_eq!(first.len(), 5);
        let dates: Vec<_> = first.iter().map(|t| t.departure_date.as_str()).collect();
        assert_eq!(
            dates,
            vec!["2025-06-01", "2025-06-02", "2025-06-03", "2025-06-04", "2025-06-05"]
        );

        // A fresh call starts over from the beginning
        let second = collect(&store).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_list_empty() {
        let (store, _temp) = create_test_store();
        assert!(collect(&store).await.is_empty());
    }

    #[tokio::test]
    async fn test_list_by_owner() {
        let (store, _temp) = create_test_store();
        let alice = UserId::new();
        let bob = UserId::new();

        store
            .create(alice, flight("SFO", "JFK", "2025-06-01"))
            .await
            .unwrap();
        store
            .create(bob, flight("LAX", "ORD", "2025-06-01"))
            .await
            .unwrap();
        store
            .create(alice, flight("JFK", "SFO", "2025-06-08"))
            .await
            .unwrap();

        let mine = store.list_by_owner(alice).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|t| t.owner_id == alice));
    }

    #[tokio::test]
    async fn test_cancel_by_departure_date_is_owner_scoped() {
        let (store, _temp) = create_test_store();
        let alice = UserId::new();
        let bob = UserId::new();

        store
            .create(alice, flight("SFO", "JFK", "2025-06-01"))
            .await
            .unwrap();

        let by_bob = store.cancel_by_departure_date(bob, "2025-06-01").await;
        assert!(matches!(by_bob, Err(TicketStoreError::NotFound)));

        store
            .cancel_by_departure_date(alice, "2025-06-01")
            .await
            .unwrap();
        assert!(store.list_by_owner(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let (store, _temp) = create_test_store();
        let alice = UserId::new();
        let bob = UserId::new();

        for date in ["2025-06-01", "2025-06-02"] {
            store.create(alice, flight("SFO", "JFK", date)).await.unwrap();
        }
        store
            .create(bob, flight("SFO", "JFK", "2025-06-01"))
            .await
            .unwrap();

        assert_eq!(store.cancel_all(alice).await.unwrap(), 2);
        assert_eq!(store.cancel_all(alice).await.unwrap(), 0);
        assert_eq!(collect(&store).await.len(), 1);
    }
}

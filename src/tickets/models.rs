//! Ticket Models

use crate::auth::models::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub Uuid);

impl TicketId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A booked flight. `owner_id` is a logical link only; nothing cascades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub owner_id: UserId,
    pub starting_point: String, // IATA code
    pub ending_point: String,   // IATA code
    pub departure_date: String, // YYYY-MM-DD
    pub jet_type: String,
    pub created_at: String,
}

/// Ticket fields submitted by the booking form
#[derive(Debug, Clone, Deserialize)]
pub struct NewTicket {
    pub starting_point: String,
    pub ending_point: String,
    pub departure_date: String,
    pub jet_type: String,
}

/// Owner-scoped cancellation by departure date
#[derive(Debug, Deserialize)]
pub struct CancelForm {
    pub departure_date: String,
}

#[derive(Debug, Serialize)]
pub struct CancelAllResponse {
    pub removed: u64,
}

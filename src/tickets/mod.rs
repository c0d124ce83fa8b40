//! Tickets Module
//! Mission: Book, list and cancel private-jet flights

pub mod api;
pub mod models;
pub mod store;

pub use store::{TicketStore, TicketStoreError};

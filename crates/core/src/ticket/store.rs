//! Ticket storage trait.

use crate::db::StoreError;

use super::{Ticket, TicketUpdate};

/// Trait for ticket storage backends.
pub trait TicketStore: Send + Sync {
    /// Insert a new ticket. The referenced client must exist.
    fn create(&self, ticket: &Ticket) -> Result<(), StoreError>;

    /// Get a ticket by ID.
    fn get(&self, id: &str) -> Result<Option<Ticket>, StoreError>;

    /// List all tickets in insertion order.
    fn list(&self) -> Result<Vec<Ticket>, StoreError>;

    /// Change a single field and return the updated ticket.
    fn update(&self, id: &str, update: &TicketUpdate) -> Result<Ticket, StoreError>;

    /// Permanently delete a ticket.
    /// Returns the deleted ticket if found.
    fn delete(&self, id: &str) -> Result<Ticket, StoreError>;
}

//! Support tickets and their kanban lifecycle.

pub mod lifecycle;
mod store;
mod types;

pub use lifecycle::{Conversion, LifecycleError};
pub use store::TicketStore;
pub use types::{NewTicket, Stage, Ticket, TicketEdit, TicketUpdate, UnknownStage};

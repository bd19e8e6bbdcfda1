//! Clients that tickets are opened for.

mod store;
mod types;

pub use store::ClientStore;
pub use types::{Client, ClientUpdate};

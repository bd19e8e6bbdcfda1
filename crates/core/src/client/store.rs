//! Client storage trait.

use crate::db::StoreError;

use super::{Client, ClientUpdate};

/// Trait for client storage backends.
pub trait ClientStore: Send + Sync {
    /// Insert a client, or replace every field of the client with the same id.
    fn upsert(&self, client: &Client) -> Result<(), StoreError>;

    /// List all clients ordered by name.
    fn list(&self) -> Result<Vec<Client>, StoreError>;

    /// Change a single field and return the updated client.
    fn update(&self, id: &str, update: &ClientUpdate) -> Result<Client, StoreError>;

    /// Permanently delete a client. Fails while tickets still reference it.
    fn delete(&self, id: &str) -> Result<Client, StoreError>;
}

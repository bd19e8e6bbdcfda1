//! Order storage trait.

use crate::db::StoreError;

use super::{Order, OrderUpdate};

/// Trait for order storage backends.
pub trait OrderStore: Send + Sync {
    /// Insert a new order. The store stamps `created_at`.
    fn create(&self, order: &Order) -> Result<Order, StoreError>;

    /// List all orders, most recent first.
    fn list(&self) -> Result<Vec<Order>, StoreError>;

    /// Change a single field and return the updated order.
    fn update(&self, id: &str, update: &OrderUpdate) -> Result<Order, StoreError>;

    /// Permanently delete an order.
    fn delete(&self, id: &str) -> Result<Order, StoreError>;
}

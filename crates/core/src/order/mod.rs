//! Work orders produced from completed tickets.

mod store;
mod types;

pub use store::OrderStore;
pub use types::{next_order_number, Order, OrderStatus, OrderUpdate, ORDER_NUMBER_WIDTH};

//! Collections the desk keeps in sync.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{Client, ClientUpdate};
use crate::desk::DeskState;
use crate::order::{Order, OrderUpdate};
use crate::ticket::{Ticket, TicketUpdate};

/// A record type stored in one remote collection and one [`DeskState`] list.
pub trait Resource: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Single-field change, serialized as `{"field": ..., "value": ...}`.
    type Update: Clone + Debug + Serialize + Send + Sync + 'static;

    /// Remote collection name, also the last segment of its URL.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    fn apply_update(&mut self, update: &Self::Update);

    fn items(state: &DeskState) -> &Vec<Self>;

    fn items_mut(state: &mut DeskState) -> &mut Vec<Self>;
}

impl Resource for Client {
    type Update = ClientUpdate;
    const COLLECTION: &'static str = "clients";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_update(&mut self, update: &ClientUpdate) {
        update.apply(self);
    }

    fn items(state: &DeskState) -> &Vec<Self> {
        &state.clients
    }

    fn items_mut(state: &mut DeskState) -> &mut Vec<Self> {
        &mut state.clients
    }
}

impl Resource for Ticket {
    type Update = TicketUpdate;
    const COLLECTION: &'static str = "tickets";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_update(&mut self, update: &TicketUpdate) {
        update.apply(self);
    }

    fn items(state: &DeskState) -> &Vec<Self> {
        &state.tickets
    }

    fn items_mut(state: &mut DeskState) -> &mut Vec<Self> {
        &mut state.tickets
    }
}

impl Resource for Order {
    type Update = OrderUpdate;
    const COLLECTION: &'static str = "orders";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_update(&mut self, update: &OrderUpdate) {
        update.apply(self);
    }

    fn items(state: &DeskState) -> &Vec<Self> {
        &state.orders
    }

    fn items_mut(state: &mut DeskState) -> &mut Vec<Self> {
        &mut state.orders
    }
}

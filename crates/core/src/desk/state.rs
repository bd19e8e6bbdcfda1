//! The local copy of every collection.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::order::Order;
use crate::ticket::{Stage, Ticket};

/// Everything the desk knows locally. The remote store is the source of
/// truth; this is a cache that optimistic writes run ahead of.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeskState {
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl DeskState {
    /// Copy of the whole state, taken before an optimistic mutation.
    pub fn snapshot(&self) -> DeskState {
        self.clone()
    }

    /// Put a snapshot back.
    pub fn restore(&mut self, snapshot: DeskState) {
        *self = snapshot;
    }

    pub fn ticket(&self, id: &str) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    pub fn client(&self, id: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn order(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Tickets in one board column, in list order.
    pub fn tickets_in(&self, stage: Stage) -> impl Iterator<Item = &Ticket> {
        self.tickets.iter().filter(move |t| t.stage == stage)
    }

    /// Board counters. Overdue orders are only counted when `highlight_overdue`.
    pub fn summary(&self, today: NaiveDate, highlight_overdue: bool) -> BoardSummary {
        let tickets_by_stage = Stage::ALL
            .into_iter()
            .map(|stage| (stage, self.tickets_in(stage).count()))
            .collect();

        let overdue_orders = if highlight_overdue {
            self.orders.iter().filter(|o| o.is_overdue(today)).count()
        } else {
            0
        };

        BoardSummary {
            tickets_by_stage,
            total_orders: self.orders.len(),
            overdue_orders,
        }
    }
}

/// Counters shown above the board.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardSummary {
    /// Ticket count for every stage, including empty columns.
    pub tickets_by_stage: BTreeMap<Stage, usize>,
    pub total_orders: usize,
    pub overdue_orders: usize,
}

impl BoardSummary {
    pub fn tickets(&self, stage: Stage) -> usize {
        self.tickets_by_stage.get(&stage).copied().unwrap_or(0)
    }
}

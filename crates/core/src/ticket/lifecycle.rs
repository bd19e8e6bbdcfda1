//! Ticket state machine.
//!
//! Every function here mutates the local [`DeskState`] only. Persisting the
//! change is the caller's job (see [`crate::desk::Desk`]), which is what lets
//! a failed remote write roll these mutations back.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info};

use super::{NewTicket, Stage, Ticket, TicketEdit};
use crate::desk::DeskState;
use crate::order::{next_order_number, Order};
use crate::profile::Profile;

/// Errors raised before any state is touched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// A required field is missing or refers to something unknown.
    #[error("{0}")]
    Validation(String),
}

/// Result of converting a completed ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// The ticket that was removed.
    pub ticket: Ticket,
    /// The order that replaced it.
    pub order: Order,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn stamp(ticket: &mut Ticket, profile: &Profile) {
    ticket.assignee_name = Some(profile.first_name().to_string());
    ticket.assignee_avatar = profile.avatar.clone();
}

/// Validate and append a new ticket at [`Stage::New`].
pub fn submit(
    state: &mut DeskState,
    profile: &Profile,
    request: NewTicket,
    today: NaiveDate,
) -> Result<Ticket, LifecycleError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(LifecycleError::Validation("Title is required".to_string()));
    }

    let client = state
        .clients
        .iter()
        .find(|c| c.id == request.client_id)
        .ok_or_else(|| LifecycleError::Validation("Select a client".to_string()))?;

    let mut ticket = Ticket {
        id: uuid::Uuid::new_v4().to_string(),
        client_id: client.id.clone(),
        title: title.to_string(),
        module: trimmed(request.module),
        reason: trimmed(request.reason),
        date: Some(request.date.unwrap_or(today)),
        requester: trimmed(request.requester),
        stage: Stage::New,
        client_code: client.code.clone(),
        client_name: Some(client.name.clone()),
        assignee_name: None,
        assignee_avatar: None,
        problem: None,
        solution: None,
    };
    stamp(&mut ticket, profile);

    info!(ticket_id = %ticket.id, client_id = %ticket.client_id, "Ticket submitted");
    state.tickets.push(ticket.clone());
    Ok(ticket)
}

/// Move a ticket to `stage` and stamp the acting profile.
///
/// Returns false when the id is unknown.
pub fn move_to(state: &mut DeskState, id: &str, stage: Stage, profile: &Profile) -> bool {
    let Some(ticket) = state.tickets.iter_mut().find(|t| t.id == id) else {
        debug!(ticket_id = %id, "Move ignored, ticket not found");
        return false;
    };

    let from = ticket.stage;
    ticket.stage = stage;
    stamp(ticket, profile);
    info!(ticket_id = %id, from = %from, to = %stage, "Ticket moved");
    true
}

/// Send a done ticket back to [`Stage::New`].
///
/// Any other stage, or an unknown id, is left alone and returns false.
pub fn reopen(state: &mut DeskState, id: &str, profile: &Profile) -> bool {
    let Some(ticket) = state.tickets.iter_mut().find(|t| t.id == id) else {
        return false;
    };
    if !ticket.stage.can_reopen() {
        debug!(ticket_id = %id, stage = %ticket.stage, "Reopen ignored");
        return false;
    }

    ticket.stage = Stage::New;
    stamp(ticket, profile);
    info!(ticket_id = %id, "Ticket reopened");
    true
}

/// Apply an edit form. A missing date keeps the current one.
pub fn edit(state: &mut DeskState, id: &str, edit: TicketEdit) -> Result<bool, LifecycleError> {
    let title = edit.title.trim();
    if title.is_empty() {
        return Err(LifecycleError::Validation("Title is required".to_string()));
    }

    let Some(ticket) = state.tickets.iter_mut().find(|t| t.id == id) else {
        return Ok(false);
    };

    ticket.title = title.to_string();
    ticket.module = trimmed(edit.module);
    ticket.reason = trimmed(edit.reason);
    if let Some(date) = edit.date {
        ticket.date = Some(date);
    }
    info!(ticket_id = %id, "Ticket edited");
    Ok(true)
}

/// Store the problem/solution write-up.
pub fn record_resolution(
    state: &mut DeskState,
    id: &str,
    problem: Option<String>,
    solution: Option<String>,
) -> bool {
    let Some(ticket) = state.tickets.iter_mut().find(|t| t.id == id) else {
        return false;
    };

    ticket.problem = trimmed(problem);
    ticket.solution = trimmed(solution);
    info!(ticket_id = %id, "Ticket resolution recorded");
    true
}

/// Remove a ticket. Returns the removed ticket, or `None` for an unknown id.
pub fn delete(state: &mut DeskState, id: &str) -> Option<Ticket> {
    let index = state.tickets.iter().position(|t| t.id == id)?;
    let ticket = state.tickets.remove(index);
    info!(ticket_id = %id, "Ticket deleted");
    Some(ticket)
}

/// Turn a done ticket into the next numbered order.
///
/// The ticket is removed and the order appended. Returns `None` when the id is
/// unknown or the ticket is not done.
pub fn convert_to_order(state: &mut DeskState, id: &str, today: NaiveDate) -> Option<Conversion> {
    let index = state.tickets.iter().position(|t| t.id == id)?;
    if !state.tickets[index].stage.can_convert() {
        debug!(ticket_id = %id, stage = %state.tickets[index].stage, "Conversion ignored");
        return None;
    }

    let number = next_order_number(&state.orders);
    let ticket = state.tickets.remove(index);
    let order = Order::new(number, ticket.order_title(), today);
    state.orders.push(order.clone());

    info!(ticket_id = %id, order_number = %order.number, "Ticket converted to order");
    Some(Conversion { ticket, order })
}

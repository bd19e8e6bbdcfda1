//! Desk behaviour against mock remote collections.

use std::sync::Arc;

use servicedesk_core::testing::{fixtures, CallKind, MockRemote, RecordedCall, RecordingView};
use servicedesk_core::{
    Client, ClientUpdate, Desk, DeskError, DeskRemotes, DeskState, NewTicket, Order, OrderStatus,
    Stage, Ticket, TicketEdit,
};

struct Setup {
    desk: Desk,
    view: Arc<RecordingView>,
    clients: Arc<MockRemote<Client>>,
    tickets: Arc<MockRemote<Ticket>>,
    orders: Arc<MockRemote<Order>>,
}

/// Desk whose local state and remote collections both start as `state`.
fn setup(state: DeskState, reconcile: bool) -> Setup {
    let view = Arc::new(RecordingView::new());
    let clients = Arc::new(MockRemote::with_items(state.clients.clone()));
    let tickets = Arc::new(MockRemote::with_items(state.tickets.clone()));
    let orders = Arc::new(MockRemote::with_items(state.orders.clone()));

    let remotes = DeskRemotes {
        clients: clients.clone(),
        tickets: tickets.clone(),
        orders: orders.clone(),
    };
    let desk = Desk::new(fixtures::profile(), view.clone(), remotes, reconcile)
        .with_state(state)
        .with_today(fixtures::today());

    Setup {
        desk,
        view,
        clients,
        tickets,
        orders,
    }
}

fn acme() -> Client {
    fixtures::client("c1", "C01", "Acme")
}

fn state_with(tickets: Vec<Ticket>, orders: Vec<Order>) -> DeskState {
    DeskState {
        clients: vec![acme()],
        tickets,
        orders,
    }
}

// ============================================================================
// Submission and moves
// ============================================================================

#[tokio::test]
async fn test_submit_persists_new_ticket() {
    let mut s = setup(state_with(vec![], vec![]), true);

    let ticket = s
        .desk
        .submit_ticket(NewTicket::new("c1", "Printer offline").with_requester("Rita"))
        .await
        .unwrap();

    assert_eq!(ticket.stage, Stage::New);
    assert_eq!(ticket.assignee_name.as_deref(), Some("Ana"));
    assert_eq!(ticket.date, Some(fixtures::today()));
    assert_eq!(s.tickets.items().await, vec![ticket.clone()]);
    assert_eq!(s.desk.state().tickets, vec![ticket]);
}

#[tokio::test]
async fn test_submit_failure_removes_ticket_and_shows_message() {
    let mut s = setup(state_with(vec![], vec![]), true);
    s.tickets.fail_next(CallKind::Create, "FOREIGN KEY constraint failed").await;

    let err = s
        .desk
        .submit_ticket(NewTicket::new("c1", "Printer offline"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "FOREIGN KEY constraint failed");
    assert!(s.desk.state().tickets.is_empty());
    assert_eq!(s.view.failures(), vec!["FOREIGN KEY constraint failed".to_string()]);
}

#[tokio::test]
async fn test_move_sends_stage_and_assignee() {
    let ticket = fixtures::ticket("t1", &acme(), "x", Stage::New);
    let mut s = setup(state_with(vec![ticket], vec![]), false);
    s.desk.set_profile(servicedesk_core::Profile::new("Bruno Lima"));

    s.desk.move_ticket("t1", Stage::Scheduled).await.unwrap();

    let fields: Vec<_> = s
        .tickets
        .recorded_calls()
        .await
        .into_iter()
        .filter_map(|call| match call {
            RecordedCall::Update { field, .. } => Some(field),
            _ => None,
        })
        .collect();
    assert_eq!(fields, vec!["stage", "assignee_name", "assignee_avatar"]);

    let remote = &s.tickets.items().await[0];
    assert_eq!(remote.stage, Stage::Scheduled);
    assert_eq!(remote.assignee_name.as_deref(), Some("Bruno"));
}

#[tokio::test]
async fn test_move_failure_restores_stage() {
    let ticket = fixtures::ticket("t1", &acme(), "x", Stage::Waiting);
    let mut s = setup(state_with(vec![ticket.clone()], vec![]), false);
    s.tickets.fail_next(CallKind::Update, "PATCH /api/tickets failed").await;

    let result = s.desk.move_ticket("t1", Stage::Done).await;

    assert!(matches!(result, Err(DeskError::Sync(_))));
    assert_eq!(s.desk.state().tickets, vec![ticket]);
    assert_eq!(s.view.last_rendered().unwrap().tickets[0].stage, Stage::Waiting);
}

#[tokio::test]
async fn test_move_rejected_midway_matches_remote() {
    let ticket = fixtures::ticket("t1", &acme(), "x", Stage::Waiting);
    let mut s = setup(state_with(vec![ticket], vec![]), false);
    s.tickets
        .fail_after(CallKind::Update, 1, "PATCH /api/tickets failed")
        .await;

    let result = s.desk.move_ticket("t1", Stage::Done).await;

    assert!(matches!(result, Err(DeskError::Sync(_))));
    let remote = s.tickets.items().await;
    assert_eq!(remote[0].stage, Stage::Done);
    assert_eq!(s.desk.state().tickets, remote);
    assert_eq!(s.view.failures(), vec!["PATCH /api/tickets failed".to_string()]);
    assert_eq!(s.tickets.calls_of(CallKind::Update).await, 2);
}

#[tokio::test]
async fn test_stage_sequence_stays_on_board() {
    let ticket = fixtures::ticket("t1", &acme(), "x", Stage::New);
    let mut s = setup(state_with(vec![ticket], vec![]), false);

    let sequence = [
        Stage::Done,
        Stage::Waiting,
        Stage::InProgress,
        Stage::Scheduled,
        Stage::New,
        Stage::Done,
    ];
    for stage in sequence {
        s.desk.move_ticket("t1", stage).await.unwrap();
        let current = s.desk.state().ticket("t1").unwrap().stage;
        assert!(Stage::ALL.contains(&current));
        assert_eq!(current, stage);
    }
}

#[tokio::test]
async fn test_reopen_only_from_done() {
    let tickets = vec![
        fixtures::ticket("done", &acme(), "a", Stage::Done),
        fixtures::ticket("waiting", &acme(), "b", Stage::Waiting),
    ];
    let mut s = setup(state_with(tickets, vec![]), false);

    s.desk.reopen_ticket("waiting").await.unwrap();
    assert_eq!(s.desk.state().ticket("waiting").unwrap().stage, Stage::Waiting);
    assert!(s.tickets.recorded_calls().await.is_empty());

    s.desk.reopen_ticket("done").await.unwrap();
    assert_eq!(s.desk.state().ticket("done").unwrap().stage, Stage::New);
}

#[tokio::test]
async fn test_edit_and_resolution() {
    let ticket = fixtures::ticket("t1", &acme(), "x", Stage::InProgress);
    let mut s = setup(state_with(vec![ticket], vec![]), true);

    s.desk
        .edit_ticket(
            "t1",
            TicketEdit {
                title: "Fiscal printer offline".to_string(),
                module: Some("Fiscal".to_string()),
                reason: Some("Hardware".to_string()),
                date: None,
            },
        )
        .await
        .unwrap();
    s.desk
        .record_resolution("t1", Some("Cable loose".to_string()), Some("Reseated".to_string()))
        .await
        .unwrap();

    let remote = &s.tickets.items().await[0];
    assert_eq!(remote.title, "Fiscal printer offline");
    assert_eq!(remote.date, Some(fixtures::today()));
    assert_eq!(remote.problem.as_deref(), Some("Cable loose"));
    assert_eq!(remote.solution.as_deref(), Some("Reseated"));
    assert_eq!(s.desk.state().tickets[0], *remote);
}

#[tokio::test]
async fn test_edit_blank_title_is_validation() {
    let ticket = fixtures::ticket("t1", &acme(), "x", Stage::New);
    let mut s = setup(state_with(vec![ticket], vec![]), false);

    let result = s.desk.edit_ticket("t1", TicketEdit::default()).await;

    assert!(matches!(result, Err(DeskError::Validation(_))));
    assert!(s.tickets.recorded_calls().await.is_empty());
    assert_eq!(s.view.failures().len(), 1);
}

#[tokio::test]
async fn test_delete_missing_ticket_is_noop() {
    let mut s = setup(state_with(vec![], vec![]), true);

    s.desk.delete_ticket("ghost").await.unwrap();
    s.desk.delete_order("ghost").await.unwrap();
    s.desk.delete_client("ghost").await.unwrap();

    assert!(s.tickets.recorded_calls().await.is_empty());
    assert!(s.orders.recorded_calls().await.is_empty());
    assert!(s.clients.recorded_calls().await.is_empty());
    assert!(s.view.failures().is_empty());
}

// ============================================================================
// Conversion
// ============================================================================

#[tokio::test]
async fn test_convert_numbers_after_maximum() {
    let ticket = fixtures::ticket("t1", &acme(), "Replace fuser", Stage::Done);
    let orders = vec![fixtures::order("001", "a"), fixtures::order("005", "b")];
    let mut s = setup(state_with(vec![ticket], orders), true);

    let order = s.desk.convert_to_order("t1").await.unwrap().unwrap();

    assert_eq!(order.number, "006");
    assert_eq!(order.title, "Replace fuser");
    assert_eq!(order.status, OrderStatus::Launched);
    assert_eq!(order.target_date, Some(fixtures::today()));

    assert!(s.desk.state().tickets.is_empty());
    assert_eq!(s.desk.state().orders.len(), 3);
    assert!(s.tickets.items().await.is_empty());
    assert_eq!(
        s.orders.items().await.iter().filter(|o| o.number == "006").count(),
        1
    );
}

#[tokio::test]
async fn test_convert_failure_restores_done_ticket() {
    let ticket = fixtures::ticket("t1", &acme(), "Replace fuser", Stage::Done);
    let existing = fixtures::order("001", "a");
    let mut s = setup(state_with(vec![ticket.clone()], vec![existing.clone()]), true);
    s.orders
        .fail_next(CallKind::Create, "UNIQUE constraint failed: orders.number")
        .await;

    let result = s.desk.convert_to_order("t1").await;

    assert!(matches!(result, Err(DeskError::Sync(_))));
    assert_eq!(s.desk.state().tickets, vec![ticket]);
    assert_eq!(s.desk.state().tickets[0].stage, Stage::Done);
    assert_eq!(s.desk.state().orders, vec![existing]);
    assert_eq!(
        s.view.failures(),
        vec!["UNIQUE constraint failed: orders.number".to_string()]
    );
    assert_eq!(s.tickets.calls_of(CallKind::Remove).await, 0);
}

#[tokio::test]
async fn test_convert_keeps_order_when_ticket_removal_fails() {
    let ticket = fixtures::ticket("t1", &acme(), "Replace fuser", Stage::Done);
    let mut s = setup(state_with(vec![ticket], vec![]), false);
    s.tickets.fail_next(CallKind::Remove, "DELETE /api/tickets failed").await;

    let order = s.desk.convert_to_order("t1").await.unwrap().unwrap();

    assert_eq!(order.number, "001");
    assert_eq!(s.desk.state().orders, vec![order]);
    assert!(s.desk.state().tickets.is_empty());
    assert_eq!(s.view.failures(), vec!["DELETE /api/tickets failed".to_string()]);
}

#[tokio::test]
async fn test_refresh_retries_removal_of_converted_ticket() {
    let ticket = fixtures::ticket("t1", &acme(), "Replace fuser", Stage::Done);
    let mut s = setup(state_with(vec![ticket], vec![]), false);
    s.tickets.fail_next(CallKind::Remove, "DELETE /api/tickets failed").await;

    s.desk.convert_to_order("t1").await.unwrap().unwrap();
    assert_eq!(s.tickets.items().await.len(), 1);

    s.desk.refresh_all().await.unwrap();

    assert!(s.desk.state().tickets.is_empty());
    assert!(s.tickets.items().await.is_empty());
    assert_eq!(s.desk.state().orders.len(), 1);
}

#[tokio::test]
async fn test_converted_ticket_is_not_converted_twice() {
    let ticket = fixtures::ticket("t1", &acme(), "Replace fuser", Stage::Done);
    let mut s = setup(state_with(vec![ticket], vec![]), false);
    s.tickets.fail_next(CallKind::Remove, "DELETE /api/tickets failed").await;
    s.tickets.fail_next(CallKind::Remove, "DELETE /api/tickets failed").await;

    s.desk.convert_to_order("t1").await.unwrap().unwrap();
    s.desk.refresh_all().await.unwrap();

    // Still on the remote, but kept off the board.
    assert_eq!(s.tickets.items().await[0].id, "t1");
    assert!(s.desk.state().tickets.is_empty());

    assert!(s.desk.convert_to_order("t1").await.unwrap().is_none());
    assert_eq!(s.orders.items().await.len(), 1);
    assert_eq!(s.orders.calls_of(CallKind::Create).await, 1);
}

#[tokio::test]
async fn test_convert_requires_done() {
    let ticket = fixtures::ticket("t1", &acme(), "x", Stage::Scheduled);
    let mut s = setup(state_with(vec![ticket], vec![]), true);

    assert!(s.desk.convert_to_order("t1").await.unwrap().is_none());
    assert!(s.desk.convert_to_order("ghost").await.unwrap().is_none());
    assert!(s.orders.recorded_calls().await.is_empty());
    assert_eq!(s.desk.state().tickets.len(), 1);
}

// ============================================================================
// Clients, orders, loading
// ============================================================================

#[tokio::test]
async fn test_delete_client_rejected_restores_it() {
    let mut s = setup(state_with(vec![], vec![]), true);
    s.clients
        .fail_next(CallKind::Remove, "Client still has tickets")
        .await;

    let result = s.desk.delete_client("c1").await;

    assert!(result.is_err());
    assert_eq!(s.desk.state().clients, vec![acme()]);
}

#[tokio::test]
async fn test_update_client_field() {
    let beta = fixtures::client("c2", "C02", "Beta");
    let mut state = state_with(vec![], vec![]);
    state.clients.push(beta);
    let mut s = setup(state, false);

    s.desk
        .update_client_field("c2", ClientUpdate::Phone(Some("+55 11 5555-0000".to_string())))
        .await
        .unwrap();
    assert_eq!(
        s.clients.items().await[1].phone.as_deref(),
        Some("+55 11 5555-0000")
    );

    let err = s
        .desk
        .update_client_field("c2", ClientUpdate::Code(Some(" C01 ".to_string())))
        .await
        .unwrap_err();
    assert_eq!(err, DeskError::Validation("Client code C01 is already in use".to_string()));

    let err = s
        .desk
        .update_client_field("c2", ClientUpdate::Name("  ".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err, DeskError::Validation("Client name is required".to_string()));
    assert_eq!(s.clients.calls_of(CallKind::Update).await, 1);

    s.desk
        .update_client_field("c2", ClientUpdate::Code(Some("  ".to_string())))
        .await
        .unwrap();
    assert!(s.desk.state().client("c2").unwrap().code.is_none());

    assert_eq!(
        s.desk.client_choices(),
        vec![
            ("c1".to_string(), "C01 - Acme".to_string()),
            ("c2".to_string(), "Beta".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_edit_order_updates_both_fields() {
    let order = fixtures::order("001", "a");
    let mut s = setup(state_with(vec![], vec![order.clone()]), false);

    s.desk.edit_order(&order.id, "Swap drive", None).await.unwrap();

    let remote = &s.orders.items().await[0];
    assert_eq!(remote.title, "Swap drive");
    assert!(remote.target_date.is_none());
    assert_eq!(s.orders.calls_of(CallKind::Update).await, 2);
}

#[tokio::test]
async fn test_refresh_all_loads_every_collection() {
    let mut s = setup(DeskState::default(), true);
    s.clients.set_items(vec![acme()]).await;
    s.tickets
        .set_items(vec![fixtures::ticket("t1", &acme(), "x", Stage::New)])
        .await;
    s.orders.set_items(vec![fixtures::order("001", "a")]).await;

    s.desk.refresh_all().await.unwrap();

    assert_eq!(s.desk.state().clients.len(), 1);
    assert_eq!(s.desk.state().tickets.len(), 1);
    assert_eq!(s.desk.state().orders.len(), 1);
    assert_eq!(s.view.render_count(), 1);
}

#[tokio::test]
async fn test_refresh_all_keeps_local_copy_on_failure() {
    let local = state_with(vec![], vec![fixtures::order("001", "local")]);
    let mut s = setup(local.clone(), true);
    s.orders.fail_next(CallKind::List, "GET /api/orders failed").await;
    s.tickets
        .set_items(vec![fixtures::ticket("t1", &acme(), "x", Stage::New)])
        .await;

    let err = s.desk.refresh_all().await.unwrap_err();

    assert_eq!(err.to_string(), "GET /api/orders failed");
    assert_eq!(s.desk.state().orders, local.orders);
    assert_eq!(s.desk.state().tickets.len(), 1);
    assert_eq!(s.view.failures(), vec!["GET /api/orders failed".to_string()]);
}

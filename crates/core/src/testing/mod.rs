//! Testing utilities and mock implementations.
//!
//! Lets the desk run its full optimistic-write flow without a server.
//!
//! # Example
//!
//! ```rust,ignore
//! use servicedesk_core::testing::{fixtures, CallKind, MockRemote, RecordingView};
//!
//! let orders = Arc::new(MockRemote::<Order>::new());
//! orders.fail_next(CallKind::Create, "database is down").await;
//!
//! let view = Arc::new(RecordingView::new());
//! // Build a Desk over the mocks...
//! assert_eq!(view.failures(), vec!["database is down".to_string()]);
//! ```

mod mock_remote;
mod recording_view;

pub use mock_remote::{CallKind, MockRemote, RecordedCall};
pub use recording_view::RecordingView;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::NaiveDate;

    use crate::client::Client;
    use crate::order::Order;
    use crate::profile::Profile;
    use crate::ticket::{Stage, Ticket};

    /// Fixed "today" so dates in assertions are stable.
    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    pub fn profile() -> Profile {
        Profile::new("Ana Souza").with_avatar("https://example.invalid/ana.png")
    }

    pub fn client(id: &str, code: &str, name: &str) -> Client {
        Client {
            id: id.to_string(),
            code: Some(code.to_string()),
            name: name.to_string(),
            phone: None,
            responsible: None,
        }
    }

    /// A ticket for `client` already sitting at `stage`.
    pub fn ticket(id: &str, client: &Client, title: &str, stage: Stage) -> Ticket {
        Ticket {
            id: id.to_string(),
            client_id: client.id.clone(),
            title: title.to_string(),
            module: None,
            reason: None,
            date: Some(today()),
            requester: None,
            stage,
            client_code: client.code.clone(),
            client_name: Some(client.name.clone()),
            assignee_name: Some("Ana".to_string()),
            assignee_avatar: None,
            problem: None,
            solution: None,
        }
    }

    /// An order with a fresh id, due today.
    pub fn order(number: &str, title: &str) -> Order {
        Order::new(number, title, today())
    }
}

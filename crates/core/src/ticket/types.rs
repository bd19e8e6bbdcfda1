//! Core ticket data types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Stage
// ============================================================================

/// Position of a ticket on the kanban board.
///
/// ```text
/// New <-> InProgress <-> Waiting <-> Scheduled <-> Done
/// ```
///
/// Any stage can be reached from any other through a move. Reopening and
/// conversion to an order are only offered from `Done`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Freshly submitted, nobody picked it up yet.
    #[default]
    New,
    /// Someone is actively working on it.
    InProgress,
    /// Waiting on the client to get back.
    Waiting,
    /// A visit or remote session is scheduled.
    Scheduled,
    /// Work finished (terminal).
    Done,
}

impl Stage {
    /// Every stage, in board order.
    pub const ALL: [Stage; 5] = [
        Stage::New,
        Stage::InProgress,
        Stage::Waiting,
        Stage::Scheduled,
        Stage::Done,
    ];

    /// Returns true for the terminal stage.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done)
    }

    /// Returns true if a ticket in this stage may be reopened.
    pub fn can_reopen(&self) -> bool {
        self.is_terminal()
    }

    /// Returns true if a ticket in this stage may become an order.
    pub fn can_convert(&self) -> bool {
        self.is_terminal()
    }

    /// Wire/database name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::New => "new",
            Stage::InProgress => "in_progress",
            Stage::Waiting => "waiting",
            Stage::Scheduled => "scheduled",
            Stage::Done => "done",
        }
    }

    /// Human readable column title.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::New => "New",
            Stage::InProgress => "In progress",
            Stage::Waiting => "Waiting on client",
            Stage::Scheduled => "Scheduled",
            Stage::Done => "Done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a stage name that is not on the board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stage: {0}")]
pub struct UnknownStage(pub String);

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

// ============================================================================
// Ticket
// ============================================================================

/// A support request opened for a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    /// Unique identifier (UUID).
    pub id: String,

    /// Client the ticket was opened for.
    pub client_id: String,

    pub title: String,

    /// Product module the request is about.
    #[serde(default)]
    pub module: Option<String>,

    /// Reason category.
    #[serde(default)]
    pub reason: Option<String>,

    /// Date the request was made.
    #[serde(default)]
    pub date: Option<NaiveDate>,

    /// Person on the client side who asked.
    #[serde(default)]
    pub requester: Option<String>,

    /// Current board column.
    #[serde(default)]
    pub stage: Stage,

    /// Client code captured at submission.
    #[serde(default)]
    pub client_code: Option<String>,

    /// Client name captured at submission.
    #[serde(default)]
    pub client_name: Option<String>,

    /// First name of whoever touched the ticket last.
    #[serde(default)]
    pub assignee_name: Option<String>,

    #[serde(default)]
    pub assignee_avatar: Option<String>,

    /// Problem description, written when the work is documented.
    #[serde(default)]
    pub problem: Option<String>,

    /// Solution description.
    #[serde(default)]
    pub solution: Option<String>,
}

impl Ticket {
    /// Title used for an order derived from this ticket.
    ///
    /// Falls back to "code name" of the client and finally to a fixed label.
    pub fn order_title(&self) -> String {
        let title = self.title.trim();
        if !title.is_empty() {
            return title.to_string();
        }

        let client = format!(
            "{} {}",
            self.client_code.as_deref().unwrap_or(""),
            self.client_name.as_deref().unwrap_or("")
        );
        let client = client.trim();
        if !client.is_empty() {
            return client.to_string();
        }

        "Ticket".to_string()
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Form data for submitting a new ticket.
#[derive(Debug, Clone, Default)]
pub struct NewTicket {
    pub client_id: String,
    pub title: String,
    pub module: Option<String>,
    pub reason: Option<String>,
    /// Defaults to today when absent.
    pub date: Option<NaiveDate>,
    pub requester: Option<String>,
}

impl NewTicket {
    pub fn new(client_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_requester(mut self, requester: impl Into<String>) -> Self {
        self.requester = Some(requester.into());
        self
    }
}

/// Edit form for an existing ticket. A `None` date keeps the current one.
#[derive(Debug, Clone, Default)]
pub struct TicketEdit {
    pub title: String,
    pub module: Option<String>,
    pub reason: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Single-field change to a stored ticket.
///
/// Serialized adjacently tagged, e.g. `{"field": "stage", "value": "done"}`,
/// which is also the body shape of the remote partial update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum TicketUpdate {
    Stage(Stage),
    Title(String),
    Module(Option<String>),
    Reason(Option<String>),
    Date(Option<NaiveDate>),
    Requester(Option<String>),
    AssigneeName(Option<String>),
    AssigneeAvatar(Option<String>),
    Problem(Option<String>),
    Solution(Option<String>),
}

impl TicketUpdate {
    /// Column name the update targets.
    pub fn field(&self) -> &'static str {
        match self {
            TicketUpdate::Stage(_) => "stage",
            TicketUpdate::Title(_) => "title",
            TicketUpdate::Module(_) => "module",
            TicketUpdate::Reason(_) => "reason",
            TicketUpdate::Date(_) => "date",
            TicketUpdate::Requester(_) => "requester",
            TicketUpdate::AssigneeName(_) => "assignee_name",
            TicketUpdate::AssigneeAvatar(_) => "assignee_avatar",
            TicketUpdate::Problem(_) => "problem",
            TicketUpdate::Solution(_) => "solution",
        }
    }

    /// Apply the change to an in-memory ticket.
    pub fn apply(&self, ticket: &mut Ticket) {
        match self.clone() {
            TicketUpdate::Stage(stage) => ticket.stage = stage,
            TicketUpdate::Title(title) => ticket.title = title,
            TicketUpdate::Module(module) => ticket.module = module,
            TicketUpdate::Reason(reason) => ticket.reason = reason,
            TicketUpdate::Date(date) => ticket.date = date,
            TicketUpdate::Requester(requester) => ticket.requester = requester,
            TicketUpdate::AssigneeName(name) => ticket.assignee_name = name,
            TicketUpdate::AssigneeAvatar(avatar) => ticket.assignee_avatar = avatar,
            TicketUpdate::Problem(problem) => ticket.problem = problem,
            TicketUpdate::Solution(solution) => ticket.solution = solution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_ticket() -> Ticket {
        Ticket {
            id: "t1".to_string(),
            client_id: "c1".to_string(),
            title: "Printer offline".to_string(),
            module: None,
            reason: None,
            date: None,
            requester: None,
            stage: Stage::New,
            client_code: Some("C01".to_string()),
            client_name: Some("Acme".to_string()),
            assignee_name: None,
            assignee_avatar: None,
            problem: None,
            solution: None,
        }
    }

    #[test]
    fn test_only_done_is_terminal() {
        for stage in Stage::ALL {
            assert_eq!(stage.is_terminal(), stage == Stage::Done);
            assert_eq!(stage.can_reopen(), stage == Stage::Done);
            assert_eq!(stage.can_convert(), stage == Stage::Done);
        }
    }

    #[test]
    fn test_stage_string_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(stage.as_str().parse::<Stage>().unwrap(), stage);
            assert_eq!(serde_json::to_value(stage).unwrap(), json!(stage.as_str()));
        }
    }

    #[test]
    fn test_unknown_stage_rejected() {
        let err = "archived".parse::<Stage>().unwrap_err();
        assert_eq!(err, UnknownStage("archived".to_string()));
        assert!(serde_json::from_value::<Stage>(json!("archived")).is_err());
    }

    #[test]
    fn test_stage_defaults_to_new_on_deserialize() {
        let ticket: Ticket =
            serde_json::from_value(json!({"id": "t1", "client_id": "c1", "title": "x"})).unwrap();
        assert_eq!(ticket.stage, Stage::New);
    }

    #[test]
    fn test_date_serializes_as_iso() {
        let mut ticket = sample_ticket();
        ticket.date = NaiveDate::from_ymd_opt(2024, 3, 9);
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["date"], "2024-03-09");
    }

    #[test]
    fn test_order_title_fallbacks() {
        let mut ticket = sample_ticket();
        assert_eq!(ticket.order_title(), "Printer offline");

        ticket.title = "   ".to_string();
        assert_eq!(ticket.order_title(), "C01 Acme");

        ticket.client_code = None;
        assert_eq!(ticket.order_title(), "Acme");

        ticket.client_name = None;
        assert_eq!(ticket.order_title(), "Ticket");
    }

    #[test]
    fn test_update_wire_shape() {
        let update = TicketUpdate::Stage(Stage::Waiting);
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"field": "stage", "value": "waiting"})
        );

        let parsed: TicketUpdate =
            serde_json::from_value(json!({"field": "module", "value": null})).unwrap();
        assert_eq!(parsed, TicketUpdate::Module(None));
        assert_eq!(parsed.field(), "module");
    }

    #[test]
    fn test_update_unknown_field_rejected() {
        let result: Result<TicketUpdate, _> =
            serde_json::from_value(json!({"field": "client_id", "value": "c2"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_apply() {
        let mut ticket = sample_ticket();
        TicketUpdate::Stage(Stage::Scheduled).apply(&mut ticket);
        TicketUpdate::Problem(Some("paper jam".to_string())).apply(&mut ticket);
        assert_eq!(ticket.stage, Stage::Scheduled);
        assert_eq!(ticket.problem.as_deref(), Some("paper jam"));
    }
}

//! Work order data types and numbering.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Width that order numbers are zero padded to.
pub const ORDER_NUMBER_WIDTH: usize = 3;

/// Status of a work order.
///
/// Orders have one fixed status: every order, whether converted from a ticket
/// or created directly, is `Launched`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Launched,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Launched => "launched",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Launched => "Launched",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "launched" => Ok(OrderStatus::Launched),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

/// A billable/trackable unit of work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    /// Unique identifier (UUID).
    pub id: String,

    /// Sequential, zero padded number ("001", "002", ...).
    pub number: String,

    pub title: String,

    #[serde(default)]
    pub status: OrderStatus,

    /// Date the work is expected to be done by.
    #[serde(default)]
    pub target_date: Option<NaiveDate>,

    /// Set by the store when the order is persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Build a launched order with a fresh id.
    pub fn new(number: impl Into<String>, title: impl Into<String>, target_date: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            number: number.into(),
            title: title.into(),
            status: OrderStatus::Launched,
            target_date: Some(target_date),
            created_at: None,
        }
    }

    /// Numeric value of the leading digits of the order number.
    ///
    /// `"12abc"` reads as 12 and a number without leading digits as 0. Digits
    /// too large for a `u64` saturate.
    pub fn numeric_number(&self) -> u64 {
        let digits: &str = {
            let trimmed = self.number.trim_start();
            let end = trimmed
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(trimmed.len());
            &trimmed[..end]
        };
        if digits.is_empty() {
            return 0;
        }
        digits.parse().unwrap_or(u64::MAX)
    }

    /// Returns true if the target date is strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.target_date.is_some_and(|target| target < today)
    }
}

/// Next order number: the largest existing number plus one, zero padded.
///
/// The maximum is taken over every known order, not the last one, so gaps and
/// out-of-order lists never produce a duplicate.
pub fn next_order_number(orders: &[Order]) -> String {
    let max = orders.iter().map(Order::numeric_number).max().unwrap_or(0);
    format!("{:0width$}", max.saturating_add(1), width = ORDER_NUMBER_WIDTH)
}

/// Single-field change to a stored order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum OrderUpdate {
    Title(String),
    TargetDate(Option<NaiveDate>),
}

impl OrderUpdate {
    pub fn field(&self) -> &'static str {
        match self {
            OrderUpdate::Title(_) => "title",
            OrderUpdate::TargetDate(_) => "target_date",
        }
    }

    pub fn apply(&self, order: &mut Order) {
        match self.clone() {
            OrderUpdate::Title(title) => order.title = title,
            OrderUpdate::TargetDate(date) => order.target_date = date,
        }
    }
}

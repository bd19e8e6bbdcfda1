//! SQLite-backed store for clients, tickets and orders.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::StoreError;
use crate::client::{Client, ClientStore, ClientUpdate};
use crate::order::{Order, OrderStatus, OrderStore, OrderUpdate};
use crate::ticket::{Stage, Ticket, TicketStore, TicketUpdate};

const DATE_FORMAT: &str = "%Y-%m-%d";

const CLIENT_COLUMNS: &str = "id, code, name, phone, responsible";

const TICKET_COLUMNS: &str = "id, client_id, title, module, reason, date, requester, stage, \
     client_code, client_name, assignee_name, assignee_avatar, problem, solution";

const ORDER_COLUMNS: &str = "id, number, title, status, target_date, created_at";

/// SQLite-backed store.
///
/// One connection serves all three tables so the ticket -> client foreign key
/// is enforced on every write.
pub struct SqliteDeskStore {
    conn: Mutex<Connection>,
}

impl SqliteDeskStore {
    /// Open (or create) the database file and its tables.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create any missing tables. Safe to call repeatedly.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn()?;
        Self::initialize_schema(&conn)
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                id TEXT PRIMARY KEY,
                code TEXT UNIQUE,
                name TEXT NOT NULL,
                phone TEXT,
                responsible TEXT
            );

            CREATE TABLE IF NOT EXISTS tickets (
                id TEXT PRIMARY KEY,
                client_id TEXT NOT NULL REFERENCES clients(id),
                title TEXT NOT NULL,
                module TEXT,
                reason TEXT,
                date TEXT,
                requester TEXT,
                stage TEXT NOT NULL DEFAULT 'new'
                    CHECK (stage IN ('new', 'in_progress', 'waiting', 'scheduled', 'done')),
                client_code TEXT,
                client_name TEXT,
                assignee_name TEXT,
                assignee_avatar TEXT,
                problem TEXT,
                solution TEXT
            );

            CREATE TABLE IF NOT EXISTS orders (
                id TEXT PRIMARY KEY,
                number TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'launched',
                target_date TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_clients_name ON clients(name);
            CREATE INDEX IF NOT EXISTS idx_tickets_client_id ON tickets(client_id);
            CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders(created_at);
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Database(format!("connection lock poisoned: {}", e)))
    }

    fn row_to_client(row: &Row) -> rusqlite::Result<Client> {
        Ok(Client {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            phone: row.get(3)?,
            responsible: row.get(4)?,
        })
    }

    fn row_to_ticket(row: &Row) -> rusqlite::Result<Ticket> {
        let stage_str: String = row.get(7)?;
        let stage = stage_str
            .parse::<Stage>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;

        Ok(Ticket {
            id: row.get(0)?,
            client_id: row.get(1)?,
            title: row.get(2)?,
            module: row.get(3)?,
            reason: row.get(4)?,
            date: parse_date(5, row.get(5)?)?,
            requester: row.get(6)?,
            stage,
            client_code: row.get(8)?,
            client_name: row.get(9)?,
            assignee_name: row.get(10)?,
            assignee_avatar: row.get(11)?,
            problem: row.get(12)?,
            solution: row.get(13)?,
        })
    }

    fn row_to_order(row: &Row) -> rusqlite::Result<Order> {
        let status_str: String = row.get(3)?;
        let status = status_str
            .parse::<OrderStatus>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into()))?;

        let created_at_str: String = row.get(5)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

        Ok(Order {
            id: row.get(0)?,
            number: row.get(1)?,
            title: row.get(2)?,
            status,
            target_date: parse_date(4, row.get(4)?)?,
            created_at: Some(created_at),
        })
    }

    fn get_client(conn: &Connection, id: &str) -> Result<Client, StoreError> {
        conn.query_row(
            &format!("SELECT {} FROM clients WHERE id = ?", CLIENT_COLUMNS),
            params![id],
            Self::row_to_client,
        )
        .optional()?
        .ok_or_else(|| StoreError::NotFound(format!("client {}", id)))
    }

    fn get_ticket(conn: &Connection, id: &str) -> Result<Option<Ticket>, StoreError> {
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM tickets WHERE id = ?", TICKET_COLUMNS),
                params![id],
                Self::row_to_ticket,
            )
            .optional()?)
    }

    fn get_order(conn: &Connection, id: &str) -> Result<Order, StoreError> {
        conn.query_row(
            &format!("SELECT {} FROM orders WHERE id = ?", ORDER_COLUMNS),
            params![id],
            Self::row_to_order,
        )
        .optional()?
        .ok_or_else(|| StoreError::NotFound(format!("order {}", id)))
    }

    /// Run `UPDATE table SET column = value WHERE id = ?`, failing when no row matched.
    fn update_column(
        conn: &Connection,
        table: &str,
        column: &str,
        value: Value,
        id: &str,
    ) -> Result<(), StoreError> {
        let sql = format!("UPDATE {} SET {} = ? WHERE id = ?", table, column);
        let changed = conn.execute(&sql, params![value, id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("{} {}", table_entity(table), id)));
        }
        Ok(())
    }
}

fn table_entity(table: &str) -> &str {
    table.strip_suffix('s').unwrap_or(table)
}

fn parse_date(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<NaiveDate>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(&s, DATE_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

fn text(value: Option<String>) -> Value {
    value.map(Value::Text).unwrap_or(Value::Null)
}

/// Blank codes are stored as NULL so they never collide on the unique index.
fn normalized_code(code: Option<&str>) -> Option<String> {
    code.map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

impl ClientStore for SqliteDeskStore {
    fn upsert(&self, client: &Client) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO clients (id, code, name, phone, responsible) VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                code = excluded.code,
                name = excluded.name,
                phone = excluded.phone,
                responsible = excluded.responsible",
            params![
                client.id,
                normalized_code(client.code.as_deref()),
                client.name,
                client.phone,
                client.responsible,
            ],
        )?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<Client>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM clients ORDER BY name ASC, id ASC",
            CLIENT_COLUMNS
        ))?;
        let clients = stmt
            .query_map([], Self::row_to_client)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(clients)
    }

    fn update(&self, id: &str, update: &ClientUpdate) -> Result<Client, StoreError> {
        let conn = self.conn()?;
        let value = match update.clone() {
            ClientUpdate::Code(code) => text(normalized_code(code.as_deref())),
            ClientUpdate::Name(name) => Value::Text(name),
            ClientUpdate::Phone(phone) => text(phone),
            ClientUpdate::Responsible(responsible) => text(responsible),
        };
        Self::update_column(&conn, "clients", update.field(), value, id)?;
        Self::get_client(&conn, id)
    }

    fn delete(&self, id: &str) -> Result<Client, StoreError> {
        let conn = self.conn()?;
        let client = Self::get_client(&conn, id)?;
        conn.execute("DELETE FROM clients WHERE id = ?", params![id])?;
        Ok(client)
    }
}

impl TicketStore for SqliteDeskStore {
    fn create(&self, ticket: &Ticket) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO tickets ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                TICKET_COLUMNS
            ),
            params![
                ticket.id,
                ticket.client_id,
                ticket.title,
                ticket.module,
                ticket.reason,
                format_date(ticket.date),
                ticket.requester,
                ticket.stage.as_str(),
                ticket.client_code,
                ticket.client_name,
                ticket.assignee_name,
                ticket.assignee_avatar,
                ticket.problem,
                ticket.solution,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Ticket>, StoreError> {
        let conn = self.conn()?;
        Self::get_ticket(&conn, id)
    }

    fn list(&self) -> Result<Vec<Ticket>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tickets ORDER BY rowid ASC",
            TICKET_COLUMNS
        ))?;
        let tickets = stmt
            .query_map([], Self::row_to_ticket)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tickets)
    }

    fn update(&self, id: &str, update: &TicketUpdate) -> Result<Ticket, StoreError> {
        let conn = self.conn()?;
        let value = match update.clone() {
            TicketUpdate::Stage(stage) => Value::Text(stage.as_str().to_string()),
            TicketUpdate::Title(title) => Value::Text(title),
            TicketUpdate::Date(date) => text(format_date(date)),
            TicketUpdate::Module(v)
            | TicketUpdate::Reason(v)
            | TicketUpdate::Requester(v)
            | TicketUpdate::AssigneeName(v)
            | TicketUpdate::AssigneeAvatar(v)
            | TicketUpdate::Problem(v)
            | TicketUpdate::Solution(v) => text(v),
        };
        Self::update_column(&conn, "tickets", update.field(), value, id)?;
        Self::get_ticket(&conn, id)?.ok_or_else(|| StoreError::NotFound(format!("ticket {}", id)))
    }

    fn delete(&self, id: &str) -> Result<Ticket, StoreError> {
        let conn = self.conn()?;
        let ticket = Self::get_ticket(&conn, id)?
            .ok_or_else(|| StoreError::NotFound(format!("ticket {}", id)))?;
        conn.execute("DELETE FROM tickets WHERE id = ?", params![id])?;
        Ok(ticket)
    }
}

impl OrderStore for SqliteDeskStore {
    fn create(&self, order: &Order) -> Result<Order, StoreError> {
        let conn = self.conn()?;
        let created_at = Utc::now();
        conn.execute(
            &format!("INSERT INTO orders ({}) VALUES (?, ?, ?, ?, ?, ?)", ORDER_COLUMNS),
            params![
                order.id,
                order.number,
                order.title,
                order.status.as_str(),
                format_date(order.target_date),
                created_at.to_rfc3339(),
            ],
        )?;
        Ok(Order {
            created_at: Some(created_at),
            ..order.clone()
        })
    }

    fn list(&self) -> Result<Vec<Order>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM orders ORDER BY created_at DESC, rowid DESC",
            ORDER_COLUMNS
        ))?;
        let orders = stmt
            .query_map([], Self::row_to_order)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(orders)
    }

    fn update(&self, id: &str, update: &OrderUpdate) -> Result<Order, StoreError> {
        let conn = self.conn()?;
        let value = match update.clone() {
            OrderUpdate::Title(title) => Value::Text(title),
            OrderUpdate::TargetDate(date) => text(format_date(date)),
        };
        Self::update_column(&conn, "orders", update.field(), value, id)?;
        Self::get_order(&conn, id)
    }

    fn delete(&self, id: &str) -> Result<Order, StoreError> {
        let conn = self.conn()?;
        let order = Self::get_order(&conn, id)?;
        conn.execute("DELETE FROM orders WHERE id = ?", params![id])?;
        Ok(order)
    }
}

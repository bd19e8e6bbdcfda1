pub mod client;
pub mod config;
pub mod db;
pub mod desk;
pub mod order;
pub mod profile;
pub mod sync;
pub mod testing;
pub mod ticket;

pub use client::{Client, ClientStore, ClientUpdate};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    DeskConfig, ServerConfig,
};
pub use db::{SqliteDeskStore, StoreError};
pub use desk::{BoardSummary, Desk, DeskError, DeskRemotes, DeskState, DeskView, LocalCache, NullView};
pub use order::{next_order_number, Order, OrderStatus, OrderStore, OrderUpdate};
pub use profile::Profile;
pub use sync::{HttpRemote, RemoteCollection, RemoteError, SyncAdapter, SyncError};
pub use ticket::{Conversion, LifecycleError, NewTicket, Stage, Ticket, TicketEdit, TicketStore, TicketUpdate};

mod body;
pub mod clients;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod orders;
pub mod routes;
pub mod tickets;

pub use routes::create_router;

//! Optimistic synchronization with the remote store.
//!
//! Every user action follows the same policy:
//!
//! 1. snapshot the local [`DeskState`](crate::desk::DeskState), mutate, render
//! 2. send a single remote write (no retry, no idempotency key)
//! 3. on success, optionally re-read the collection to reconcile
//! 4. on failure, restore the snapshot, render, and show the remote message

mod adapter;
mod http;
mod remote;
mod resource;
mod transaction;

pub use adapter::SyncAdapter;
pub use http::HttpRemote;
pub use remote::{RemoteCollection, RemoteError};
pub use resource::Resource;
pub use transaction::Transaction;

use thiserror::Error;

/// A remote write failed and the local change was rolled back.
///
/// Displays as the remote message, unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{source}")]
pub struct SyncError {
    /// Collection the failed write targeted.
    pub collection: &'static str,
    pub source: RemoteError,
}

//! Client-side desk: local state, rendering seam, cache, and the [`Desk`]
//! that ties them to the synced collections.

mod cache;
mod service;
mod state;
mod view;

pub use cache::{CacheError, LocalCache};
pub use service::{Desk, DeskRemotes};
pub use state::{BoardSummary, DeskState};
pub use view::{DeskView, NullView};

use thiserror::Error;

use crate::sync::SyncError;

/// Why a desk action did not go through.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeskError {
    /// Rejected locally; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// The remote store rejected the write and it was rolled back.
    #[error(transparent)]
    Sync(#[from] SyncError),
}

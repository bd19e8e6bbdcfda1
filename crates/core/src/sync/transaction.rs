//! Snapshot/restore around one optimistic user action.

use tracing::warn;

use super::{RemoteError, SyncError};
use crate::desk::{DeskState, DeskView};

/// Captures the state before an optimistic mutation.
///
/// ```rust,ignore
/// let tx = Transaction::begin(&state);
/// state.orders.push(order.clone());
/// view.render(&state);
/// let outcome = remote.create(&order).await;
/// tx.settle(&mut state, view, "orders", outcome)?;
/// ```
#[derive(Debug)]
#[must_use = "a transaction must be settled or rolled back"]
pub struct Transaction {
    snapshot: DeskState,
}

impl Transaction {
    pub fn begin(state: &DeskState) -> Self {
        Self {
            snapshot: state.snapshot(),
        }
    }

    /// Keep the mutation on success. On failure restore the snapshot,
    /// re-render and pass the remote message to the view unchanged.
    pub fn settle<R>(
        self,
        state: &mut DeskState,
        view: &dyn DeskView,
        collection: &'static str,
        outcome: Result<R, RemoteError>,
    ) -> Result<R, SyncError> {
        match outcome {
            Ok(value) => Ok(value),
            Err(source) => {
                warn!(collection, error = %source, "Remote write failed, rolling back");
                self.rollback(state, view);
                view.notify_failure(source.message());
                Err(SyncError { collection, source })
            }
        }
    }

    /// Restore the snapshot and re-render.
    pub fn rollback(self, state: &mut DeskState, view: &dyn DeskView) {
        state.restore(self.snapshot);
        view.render(state);
    }
}

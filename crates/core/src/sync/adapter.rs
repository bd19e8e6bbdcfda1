//! Optimistic write-then-confirm for one collection.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{RemoteCollection, RemoteError, Resource, SyncError, Transaction};
use crate::desk::{DeskState, DeskView};

/// Keeps one [`DeskState`] list in step with its remote collection.
///
/// The high level calls (`create`, `remove`, `update_field`) snapshot, mutate,
/// render and confirm in one go. The `push_*` calls confirm a mutation the
/// caller already applied under its own [`Transaction`].
pub struct SyncAdapter<T: Resource> {
    remote: Arc<dyn RemoteCollection<T>>,
    reconcile: bool,
}

impl<T: Resource> Clone for SyncAdapter<T> {
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            reconcile: self.reconcile,
        }
    }
}

impl<T: Resource> SyncAdapter<T> {
    /// `reconcile` re-reads the collection after every confirmed write.
    pub fn new(remote: Arc<dyn RemoteCollection<T>>, reconcile: bool) -> Self {
        Self { remote, reconcile }
    }

    pub fn remote(&self) -> &Arc<dyn RemoteCollection<T>> {
        &self.remote
    }

    /// Append `item` locally, then create it remotely.
    pub async fn create(
        &self,
        state: &mut DeskState,
        view: &dyn DeskView,
        item: T,
    ) -> Result<(), SyncError> {
        let tx = Transaction::begin(state);
        T::items_mut(state).push(item.clone());
        view.render(state);
        self.push_create(tx, state, view, &item).await
    }

    /// Drop `id` locally, then remotely. An id that is not cached is a
    /// silent no-op and never reaches the remote.
    pub async fn remove(
        &self,
        state: &mut DeskState,
        view: &dyn DeskView,
        id: &str,
    ) -> Result<(), SyncError> {
        let Some(index) = T::items(state).iter().position(|item| item.id() == id) else {
            debug!(collection = T::COLLECTION, id, "Remove ignored, not cached");
            return Ok(());
        };

        let tx = Transaction::begin(state);
        T::items_mut(state).remove(index);
        view.render(state);
        self.push_remove(tx, state, view, id).await
    }

    /// Change one field locally, then remotely. Unknown ids are a no-op.
    pub async fn update_field(
        &self,
        state: &mut DeskState,
        view: &dyn DeskView,
        id: &str,
        update: T::Update,
    ) -> Result<(), SyncError> {
        if !T::items(state).iter().any(|item| item.id() == id) {
            debug!(collection = T::COLLECTION, id, "Update ignored, not cached");
            return Ok(());
        }

        let tx = Transaction::begin(state);
        if let Some(item) = T::items_mut(state).iter_mut().find(|item| item.id() == id) {
            item.apply_update(&update);
        }
        view.render(state);
        self.push_updates(tx, state, view, id, std::slice::from_ref(&update))
            .await
    }

    /// Confirm a local insert.
    pub async fn push_create(
        &self,
        tx: Transaction,
        state: &mut DeskState,
        view: &dyn DeskView,
        item: &T,
    ) -> Result<(), SyncError> {
        let outcome = self.remote.create(item).await;
        tx.settle(state, view, T::COLLECTION, outcome)?;
        info!(collection = T::COLLECTION, id = item.id(), "Create confirmed");
        self.after_write(state, view).await;
        Ok(())
    }

    /// Confirm a local removal.
    pub async fn push_remove(
        &self,
        tx: Transaction,
        state: &mut DeskState,
        view: &dyn DeskView,
        id: &str,
    ) -> Result<(), SyncError> {
        let outcome = self.remote.remove(id).await;
        tx.settle(state, view, T::COLLECTION, outcome)?;
        info!(collection = T::COLLECTION, id, "Remove confirmed");
        self.after_write(state, view).await;
        Ok(())
    }

    /// Confirm local field changes, one remote update per field, in order.
    ///
    /// The first rejected update rolls the whole action back and later
    /// fields are not sent. If earlier fields were already confirmed, the
    /// collection is re-read so the local copy matches what the remote kept.
    pub async fn push_updates(
        &self,
        tx: Transaction,
        state: &mut DeskState,
        view: &dyn DeskView,
        id: &str,
        updates: &[T::Update],
    ) -> Result<(), SyncError> {
        let mut confirmed = 0;
        let mut outcome = Ok(());
        for update in updates {
            outcome = self.remote.update_field(id, update).await;
            if outcome.is_err() {
                break;
            }
            confirmed += 1;
        }

        if let Err(err) = tx.settle(state, view, T::COLLECTION, outcome) {
            if confirmed > 0 {
                warn!(
                    collection = T::COLLECTION,
                    id,
                    confirmed,
                    "Update partially applied remotely, re-reading collection"
                );
                self.resync(state, view).await;
            }
            return Err(err);
        }
        info!(collection = T::COLLECTION, id, fields = updates.len(), "Update confirmed");
        self.after_write(state, view).await;
        Ok(())
    }

    /// Replace the local list with what the remote holds.
    ///
    /// On failure the local list is left alone.
    pub async fn refresh(&self, state: &mut DeskState) -> Result<usize, RemoteError> {
        let items = self.remote.list().await?;
        let count = items.len();
        *T::items_mut(state) = items;
        debug!(collection = T::COLLECTION, count, "Collection refreshed");
        Ok(count)
    }

    async fn after_write(&self, state: &mut DeskState, view: &dyn DeskView) {
        if self.reconcile {
            self.resync(state, view).await;
        }
    }

    /// Re-read the collection and render. A failed read keeps the local list.
    async fn resync(&self, state: &mut DeskState, view: &dyn DeskView) {
        match self.refresh(state).await {
            Ok(_) => view.render(state),
            Err(e) => {
                warn!(collection = T::COLLECTION, error = %e, "Reconcile after write failed");
            }
        }
    }
}

//! In-memory remote collection for tests.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::sync::{RemoteCollection, RemoteError, Resource};

/// Kind of remote call, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    List,
    Create,
    Update,
    Remove,
}

/// A recorded remote call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    List,
    /// Id of the created record.
    Create(String),
    Update { id: String, field: String },
    /// Id of the removed record.
    Remove(String),
}

impl RecordedCall {
    pub fn kind(&self) -> CallKind {
        match self {
            RecordedCall::List => CallKind::List,
            RecordedCall::Create(_) => CallKind::Create,
            RecordedCall::Update { .. } => CallKind::Update,
            RecordedCall::Remove(_) => CallKind::Remove,
        }
    }
}

/// Mock implementation of [`RemoteCollection`].
///
/// Holds the "server side" records, records every call, and fails the next
/// call of a given kind on request.
///
/// ```rust,ignore
/// let remote = Arc::new(MockRemote::<Order>::new());
/// remote.fail_next(CallKind::Create, "database is down").await;
///
/// let adapter = SyncAdapter::new(remote.clone(), true);
/// assert!(adapter.create(&mut state, &view, order).await.is_err());
/// assert_eq!(remote.recorded_calls().await, vec![RecordedCall::Create(id)]);
/// ```
pub struct MockRemote<T: Resource> {
    items: Arc<RwLock<Vec<T>>>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// Pending failures: kind, calls of that kind still let through, error.
    failures: Arc<RwLock<Vec<(CallKind, usize, RemoteError)>>>,
}

impl<T: Resource> std::fmt::Debug for MockRemote<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockRemote")
            .field("collection", &T::COLLECTION)
            .field("items", &"<items>")
            .field("calls", &"<calls>")
            .finish()
    }
}

impl<T: Resource> Default for MockRemote<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Resource> MockRemote<T> {
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    /// Create a mock already holding `items`.
    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
            calls: Arc::new(RwLock::new(Vec::new())),
            failures: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn set_items(&self, items: Vec<T>) {
        *self.items.write().await = items;
    }

    /// Records currently held on the "server".
    pub async fn items(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    pub async fn calls_of(&self, kind: CallKind) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.kind() == kind)
            .count()
    }

    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    /// Reject the next call of `kind` with a 500 carrying `message`.
    pub async fn fail_next(&self, kind: CallKind, message: impl Into<String>) {
        self.fail_next_with(
            kind,
            RemoteError::Rejected {
                status: 500,
                message: message.into(),
            },
        )
        .await;
    }

    /// Fail the next call of `kind` with a specific error.
    pub async fn fail_next_with(&self, kind: CallKind, error: RemoteError) {
        self.failures.write().await.push((kind, 0, error));
    }

    /// Let `passes` calls of `kind` succeed, then reject the one after with
    /// a 500 carrying `message`.
    pub async fn fail_after(&self, kind: CallKind, passes: usize, message: impl Into<String>) {
        self.failures.write().await.push((
            kind,
            passes,
            RemoteError::Rejected {
                status: 500,
                message: message.into(),
            },
        ));
    }

    async fn record(&self, call: RecordedCall) -> Result<(), RemoteError> {
        let kind = call.kind();
        self.calls.write().await.push(call);

        let mut failures = self.failures.write().await;
        match failures.iter().position(|(k, _, _)| *k == kind) {
            Some(index) if failures[index].1 > 0 => {
                failures[index].1 -= 1;
                Ok(())
            }
            Some(index) => Err(failures.remove(index).2),
            None => Ok(()),
        }
    }

    fn not_found(id: &str) -> RemoteError {
        RemoteError::Rejected {
            status: 404,
            message: format!("Not found: {}", id),
        }
    }
}

fn update_field_name<U: serde::Serialize>(update: &U) -> String {
    serde_json::to_value(update)
        .ok()
        .and_then(|v| v.get("field").and_then(|f| f.as_str()).map(str::to_string))
        .unwrap_or_default()
}

#[async_trait]
impl<T: Resource> RemoteCollection<T> for MockRemote<T> {
    async fn list(&self) -> Result<Vec<T>, RemoteError> {
        self.record(RecordedCall::List).await?;
        Ok(self.items.read().await.clone())
    }

    async fn create(&self, item: &T) -> Result<(), RemoteError> {
        self.record(RecordedCall::Create(item.id().to_string()))
            .await?;

        let mut items = self.items.write().await;
        match items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(existing) => *existing = item.clone(),
            None => items.push(item.clone()),
        }
        Ok(())
    }

    async fn update_field(&self, id: &str, update: &T::Update) -> Result<(), RemoteError> {
        self.record(RecordedCall::Update {
            id: id.to_string(),
            field: update_field_name(update),
        })
        .await?;

        let mut items = self.items.write().await;
        let item = items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        item.apply_update(update);
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), RemoteError> {
        self.record(RecordedCall::Remove(id.to_string())).await?;

        let mut items = self.items.write().await;
        let index = items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        items.remove(index);
        Ok(())
    }
}

//! Remote collection trait and its error type.

use async_trait::async_trait;
use thiserror::Error;

use super::Resource;

/// Failure of a single remote call.
///
/// `Display` is the bare message so it can be shown to the user as is.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The request never got a response (connection refused, reset, bad body).
    #[error("{0}")]
    Transport(String),

    /// The store answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

impl RemoteError {
    pub fn message(&self) -> &str {
        match self {
            RemoteError::Transport(message) => message,
            RemoteError::Rejected { message, .. } => message,
        }
    }

    /// HTTP status, when the store answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Transport(_) => None,
            RemoteError::Rejected { status, .. } => Some(*status),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        RemoteError::Transport(e.to_string())
    }
}

/// One collection on the remote store.
///
/// Writes are acknowledged only; the store is re-read with [`list`] to see
/// what it actually holds.
///
/// [`list`]: RemoteCollection::list
#[async_trait]
pub trait RemoteCollection<T: Resource>: Send + Sync {
    /// Read the whole collection.
    async fn list(&self) -> Result<Vec<T>, RemoteError>;

    /// Insert a record.
    async fn create(&self, item: &T) -> Result<(), RemoteError>;

    /// Change one field of a record.
    async fn update_field(&self, id: &str, update: &T::Update) -> Result<(), RemoteError>;

    /// Delete a record by id.
    async fn remove(&self, id: &str) -> Result<(), RemoteError>;
}

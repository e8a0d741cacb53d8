use crate::sync::item::SyncItem;

/// Outcome classification for remote calls, deciding whether a failed
/// mutation may be applied locally instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// Network failure or a 502/503/504 from the server.
    #[error("server unavailable: {0}")]
    Unavailable(String),
    /// Route or item missing on the server.
    #[error("not found on server")]
    NotFound,
    /// Any other error status. Must be surfaced, never absorbed locally.
    #[error("rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

impl RemoteError {
    /// Whether a mutation hitting this error is applied to the local copy
    /// instead of failing the caller.
    pub fn falls_back(&self) -> bool {
        matches!(self, RemoteError::Unavailable(_) | RemoteError::NotFound)
    }

    /// Whether the local fallback should warn the user that the change is
    /// local-only and will sync later. Missing routes fall back silently.
    pub fn warns(&self) -> bool {
        matches!(self, RemoteError::Unavailable(_))
    }
}

/// The server-side copy of a synced collection.
pub trait RemoteCollection<T: SyncItem> {
    async fn fetch(&self) -> Result<Vec<T>, RemoteError>;
    async fn add(&self, item: &T) -> Result<(), RemoteError>;
    async fn update_quantity(&self, key: &T::Key, quantity: i64) -> Result<(), RemoteError>;
    async fn remove(&self, key: &T::Key) -> Result<(), RemoteError>;
    async fn clear(&self) -> Result<(), RemoteError>;
}

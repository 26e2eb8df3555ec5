// Listing capability consumed by the change poller

use crate::errors::StorageError;
use async_trait::async_trait;

/// Keys returned by one listing, in the order the store returned them
pub type Snapshot = Vec<String>;

/// Lists the current contents of one collection
///
/// Implementations must be idempotent and must not modify the collection.
#[async_trait]
pub trait ObjectLister: Send + Sync {
    /// Name of the collection being listed, used when rendering notifications
    fn collection(&self) -> &str;

    /// Return the current snapshot of keys
    async fn list(&self) -> Result<Snapshot, StorageError>;
}

/// Contact record storage
///
/// Holds the collection of contact records and flushes it to the
/// persistence backend on demand. Services receive the store as an
/// injected `Arc<dyn ContactStore>`.

pub mod extent;
pub mod models;

pub use extent::ExtentStore;
pub use models::*;

use crate::error::DirectoryResult;
use async_trait::async_trait;

/// Record store contract
///
/// Email uniqueness is not enforced here; callers check with
/// `find_by_email` before creating.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Allocate a new record with a fresh secret, copying any initial data
    async fn create(&self, initial: Option<NewContact>) -> DirectoryResult<ContactRecord>;

    /// First record whose email matches exactly (case-sensitive)
    async fn find_by_email(&self, email: &str) -> DirectoryResult<Option<ContactRecord>>;

    /// All records, in no guaranteed order
    async fn list_all(&self) -> DirectoryResult<Vec<ContactRecord>>;

    /// Write back a record previously obtained from this store
    async fn save(&self, record: &ContactRecord) -> DirectoryResult<()>;

    /// Remove the first record with the given email
    async fn delete(&self, email: &str) -> DirectoryResult<bool>;

    /// Flush pending changes to durable storage
    async fn persist(&self) -> DirectoryResult<()>;
}
